// service/src/stats.rs

use std::collections::BTreeMap;

use serde::Serialize;

use models::{AmbulanceBooking, DriverProfile, EmergencyRequest, UserProfile};

/// The dashboard card counters.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub total_emergencies: u64,
    pub active_bookings: u64,
    pub total_drivers: u64,
    pub online_drivers: u64,
    pub total_users: u64,
    pub total_admins: u64,
}

impl DashboardStats {
    pub fn compute(
        emergencies: &[EmergencyRequest],
        bookings: &[AmbulanceBooking],
        drivers: &[DriverProfile],
        users: &[UserProfile],
        admin_count: u64,
    ) -> DashboardStats {
        DashboardStats {
            total_emergencies: emergencies.len() as u64,
            active_bookings: bookings.iter().filter(|b| b.status.is_active()).count() as u64,
            total_drivers: drivers.len() as u64,
            online_drivers: drivers.iter().filter(|d| d.is_online).count() as u64,
            total_users: users.len() as u64,
            total_admins: admin_count,
        }
    }
}

/// Grouped counts for chart rendering: one linear pass, labels in
/// first-seen order. For a total grouping the counts sum to `items.len()`.
pub fn group_counts<T>(items: &[T], key: impl Fn(&T) -> String) -> Vec<(String, u64)> {
    let mut groups: Vec<(String, u64)> = Vec::new();
    for item in items {
        let label = key(item);
        match groups.iter_mut().find(|(existing, _)| *existing == label) {
            Some((_, count)) => *count += 1,
            None => groups.push((label, 1)),
        }
    }
    groups
}

/// One calendar day of the report time series.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyBucket {
    pub date: String,
    pub emergencies: u64,
    pub bookings: u64,
}

/// Buckets both series by creation date truncated to a calendar day (UTC),
/// ascending by date string. Records without a decodable timestamp are
/// skipped.
pub fn daily_series(
    emergencies: &[EmergencyRequest],
    bookings: &[AmbulanceBooking],
) -> Vec<DailyBucket> {
    let mut days: BTreeMap<String, (u64, u64)> = BTreeMap::new();
    for request in emergencies {
        if let Some(created) = request.created_at {
            days.entry(created.format("%Y-%m-%d").to_string()).or_default().0 += 1;
        }
    }
    for booking in bookings {
        if let Some(created) = booking.created_at {
            days.entry(created.format("%Y-%m-%d").to_string()).or_default().1 += 1;
        }
    }
    days.into_iter()
        .map(|(date, (emergencies, bookings))| DailyBucket {
            date,
            emergencies,
            bookings,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use models::{Document, FromDocument};
    use serde_json::{json, Value};

    fn request(id: &str, data: Value) -> EmergencyRequest {
        EmergencyRequest::from_document(&Document::new(id, data))
    }

    fn booking(id: &str, data: Value) -> AmbulanceBooking {
        AmbulanceBooking::from_document(&Document::new(id, data))
    }

    #[test]
    fn grouped_status_counts_sum_to_the_record_count() {
        let requests: Vec<EmergencyRequest> = [
            ("r1", "pending"),
            ("r2", "accepted"),
            ("r3", "completed"),
            ("r4", "cancelled"),
            ("r5", "pending"),
            ("r6", "accepted"),
        ]
        .into_iter()
        .map(|(id, status)| request(id, json!({ "status": status })))
        .collect();

        let groups = group_counts(&requests, |r| r.status.to_string());
        let total: u64 = groups.iter().map(|(_, count)| count).sum();
        assert_eq!(total, requests.len() as u64);
        // first-seen order
        let labels: Vec<&str> = groups.iter().map(|(label, _)| label.as_str()).collect();
        assert_eq!(labels, vec!["pending", "accepted", "completed", "cancelled"]);
    }

    #[test]
    fn active_bookings_count_pending_and_legacy_active() {
        let bookings = vec![
            booking("b1", json!({ "status": "pending" })),
            booking("b2", json!({ "status": "active" })),
            booking("b3", json!({ "status": "completed" })),
            booking("b4", json!({ "status": "cancelled" })),
        ];
        let stats = DashboardStats::compute(&[], &bookings, &[], &[], 0);
        assert_eq!(stats.active_bookings, 2);
    }

    #[test]
    fn online_driver_count_comes_from_the_profile_flag() {
        let drivers: Vec<DriverProfile> = [
            ("d1", true),
            ("d2", false),
            ("d3", true),
        ]
        .into_iter()
        .map(|(id, online)| {
            DriverProfile::from_document(&Document::new(id, json!({ "isOnline": online })))
        })
        .collect();
        let stats = DashboardStats::compute(&[], &[], &drivers, &[], 2);
        assert_eq!(stats.total_drivers, 3);
        assert_eq!(stats.online_drivers, 2);
        assert_eq!(stats.total_admins, 2);
    }

    #[test]
    fn daily_series_buckets_by_utc_day_ascending() {
        let emergencies = vec![
            request("r1", json!({ "createdAt": "2025-04-02T23:59:00Z" })),
            request("r2", json!({ "createdAt": "2025-04-01T08:00:00Z" })),
            request("r3", json!({ "createdAt": "2025-04-02T00:10:00Z" })),
            request("r4", json!({})), // no timestamp, skipped
        ];
        let bookings = vec![booking("b1", json!({ "createdAt": "2025-04-01T12:00:00Z" }))];
        let series = daily_series(&emergencies, &bookings);
        assert_eq!(
            series,
            vec![
                DailyBucket {
                    date: "2025-04-01".to_string(),
                    emergencies: 1,
                    bookings: 1
                },
                DailyBucket {
                    date: "2025-04-02".to_string(),
                    emergencies: 2,
                    bookings: 0
                },
            ]
        );
    }
}
