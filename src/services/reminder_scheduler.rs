use crate::models::{Document, NewReminder, Reminder, date_to_timestamp};
use crate::store::DocumentStore;
use chrono::{DateTime, TimeDelta, Utc};
use tracing::{info, warn};

/// Days before expiry at which a reminder fires, with the phrase used in
/// its message.
pub const REMINDER_LEADS: [(i64, &str); 3] = [(90, "3 months"), (30, "1 month"), (7, "1 week")];

/// Reminders worth creating for `document` as of `now`.
///
/// A lead time is kept only when its fire time is strictly after `now`, so
/// nothing is ever scheduled in the past. Documents without an expiry date
/// yield nothing.
pub fn plan_reminders(document: &Document, now: DateTime<Utc>) -> Vec<NewReminder> {
    let Some(expiry) = document.expiry_date else {
        return Vec::new();
    };
    let expires_at = date_to_timestamp(expiry);

    REMINDER_LEADS
        .iter()
        .filter_map(|(days, phrase)| {
            let fire_at = TimeDelta::try_days(*days)
                .and_then(|lead| expires_at.checked_sub_signed(lead))?;
            (fire_at > now).then(|| NewReminder {
                user_id: document.user_id.clone(),
                document_id: document.id.clone(),
                reminder_date: fire_at,
                message: format!(
                    "{} expires in {} (on {})",
                    document.original_filename,
                    phrase,
                    expiry.format("%Y-%m-%d")
                ),
            })
        })
        .collect()
}

/// Persists the planned reminders for `document`.
///
/// Not idempotent: calling twice creates duplicates. A reminder that fails
/// to persist is logged and skipped; the rest are still attempted.
pub async fn schedule_expiry_reminders(
    store: &dyn DocumentStore,
    document: &Document,
) -> Vec<Reminder> {
    let planned = plan_reminders(document, Utc::now());
    let mut created = Vec::with_capacity(planned.len());

    for reminder in planned {
        let fire_at = reminder.reminder_date;
        match store.create_reminder(reminder).await {
            Ok(r) => created.push(r),
            Err(e) => warn!(
                document_id = %document.id,
                "⚠️  Failed to create reminder for {}: {}",
                fire_at.format("%Y-%m-%d"),
                e
            ),
        }
    }

    if !created.is_empty() {
        info!(
            document_id = %document.id,
            "⏰ Scheduled {} expiry reminder(s)",
            created.len()
        );
    }
    created
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{IDENTITY_DOCUMENTS, NewDocument};
    use crate::store::MemoryStore;
    use chrono::{Duration, NaiveDate};
    use serde_json::Map;

    fn new_document(expiry: Option<NaiveDate>) -> NewDocument {
        NewDocument {
            user_id: "user-1".to_string(),
            filename: "stored.jpg".to_string(),
            original_filename: "passport_john.jpg".to_string(),
            mime_type: "image/jpeg".to_string(),
            size: 42,
            category: IDENTITY_DOCUMENTS.to_string(),
            tags: vec![],
            metadata: Map::new(),
            expiry_date: expiry,
            is_encrypted: false,
        }
    }

    fn document_expiring(expiry: Option<NaiveDate>) -> Document {
        new_document(expiry).into_document()
    }

    fn now() -> DateTime<Utc> {
        "2026-01-01T12:00:00Z".parse().unwrap()
    }

    #[test]
    fn test_all_leads_in_future() {
        let doc = document_expiring(NaiveDate::from_ymd_opt(2026, 12, 31));
        let plan = plan_reminders(&doc, now());

        assert_eq!(plan.len(), 3);
        assert_eq!(
            plan[0].reminder_date,
            "2026-10-02T00:00:00Z".parse::<DateTime<Utc>>().unwrap()
        );
        assert!(plan[0].message.contains("3 months"));
        assert!(plan[1].message.contains("1 month"));
        assert!(plan[2].message.contains("1 week"));
        assert!(plan.iter().all(|r| r.message.contains("passport_john.jpg")));
    }

    #[test]
    fn test_only_future_leads_kept() {
        // Expiry is 10 days away: only the 7-day reminder is still ahead.
        let doc = document_expiring(NaiveDate::from_ymd_opt(2026, 1, 11));
        let plan = plan_reminders(&doc, now());

        assert_eq!(plan.len(), 1);
        assert!(plan[0].message.contains("1 week"));
    }

    #[test]
    fn test_lead_time_boundary_is_strict() {
        // 2026-01-08 minus 7 days is 2026-01-01T00:00Z, before `now`.
        let doc = document_expiring(NaiveDate::from_ymd_opt(2026, 1, 8));
        assert!(plan_reminders(&doc, now()).is_empty());

        let at_midnight: DateTime<Utc> = "2026-01-01T00:00:00Z".parse().unwrap();
        assert!(plan_reminders(&doc, at_midnight).is_empty());
    }

    #[test]
    fn test_past_or_missing_expiry() {
        let past = document_expiring(NaiveDate::from_ymd_opt(2020, 5, 1));
        assert!(plan_reminders(&past, now()).is_empty());

        let none = document_expiring(None);
        assert!(plan_reminders(&none, now()).is_empty());
    }

    #[test]
    fn test_leads_before_earliest_date_are_dropped() {
        let doc = document_expiring(Some(NaiveDate::MIN));
        assert!(plan_reminders(&doc, DateTime::<Utc>::MIN_UTC).is_empty());

        let doc = document_expiring(NaiveDate::MIN.checked_add_days(chrono::Days::new(10)));
        let plan = plan_reminders(&doc, DateTime::<Utc>::MIN_UTC);
        assert_eq!(plan.len(), 1);
        assert!(plan[0].message.contains("1 week"));
    }

    #[tokio::test]
    async fn test_schedule_persists_reminders() {
        let store = MemoryStore::new();
        let expiry = (Utc::now() + Duration::days(100)).date_naive();
        let doc = store
            .create_document(new_document(Some(expiry)))
            .await
            .unwrap();

        let created = schedule_expiry_reminders(&store, &doc).await;
        assert_eq!(created.len(), 3);
        assert!(created.iter().all(|r| r.is_active));

        let stored = store.get_document_reminders(&doc.id, "user-1").await.unwrap();
        assert_eq!(stored.len(), 3);
    }
}
