use chrono::{Datelike, Duration, NaiveDate};

use crate::database::models::{PaymentEvent, PaymentFrequency, PaymentSchedule, Period};

/// Map a calendar date to the payment period the schedule designates for it,
/// or `None` when the date is not a payment day. Pure function; the batch
/// trigger and the statement window scan both call it day by day.
pub fn resolve(schedule: &PaymentSchedule, target: NaiveDate) -> Option<Period> {
    let config = &schedule.period_config.0;

    match schedule.frequency {
        PaymentFrequency::Daily => Some(offset_period(
            target,
            config.start_offset.unwrap_or(0),
            config.end_offset.unwrap_or(0),
        )),
        PaymentFrequency::Weekly | PaymentFrequency::Biweekly => {
            if target.weekday().number_from_monday() as i32 != schedule.payment_day {
                return None;
            }
            Some(offset_period(
                target,
                config.start_offset.unwrap_or(0),
                config.end_offset.unwrap_or(0),
            ))
        }
        PaymentFrequency::Monthly => resolve_monthly(schedule, target),
    }
}

fn resolve_monthly(schedule: &PaymentSchedule, target: NaiveDate) -> Option<Period> {
    let config = &schedule.period_config.0;

    if let Some(events) = &config.payment_events {
        for event in events {
            if let Some(period) = match_event(schedule, event, target) {
                return Some(period);
            }
        }
        // The historical behavior fell through to the period of the last
        // evaluated event; that was an accident, not a rule. A date no event
        // claims is simply not a payment day.
        return None;
    }

    // Legacy single-offset form: one payment per month on payment_day,
    // clamped to the last day of short months.
    let effective_day = (schedule.payment_day.max(1) as u32).min(days_in_month(target));
    if target.day() != effective_day {
        return None;
    }

    if config
        .calc_rules
        .as_ref()
        .is_some_and(|rules| rules.is_previous_month())
    {
        return previous_month_period(target);
    }

    Some(offset_period(
        target,
        config.start_offset.unwrap_or(0),
        config.end_offset.unwrap_or(0),
    ))
}

fn match_event(
    schedule: &PaymentSchedule,
    event: &PaymentEvent,
    target: NaiveDate,
) -> Option<Period> {
    if event.is_end_of_month {
        // The event's day-of-month comes from the schedule's base payment_day
        // when the event also opens the month, otherwise from its own
        // next_payment_date.
        let day = if event.is_start_of_month {
            schedule.payment_day.max(1) as u32
        } else {
            event.next_payment_date?.day()
        };
        let effective_day = day.min(days_in_month(target));
        if target.day() != effective_day {
            return None;
        }
        return Some(offset_period(target, event.start_offset, event.end_offset));
    }

    // Ordinary events only claim a date when the resulting period lands
    // fully within the originating month.
    let period = offset_period(target, event.start_offset, event.end_offset);
    let same_month = |date: NaiveDate| date.year() == target.year() && date.month() == target.month();
    if same_month(period.start) && same_month(period.end) {
        Some(period)
    } else {
        None
    }
}

fn offset_period(target: NaiveDate, start_offset: i64, end_offset: i64) -> Period {
    Period::new(
        target + Duration::days(start_offset),
        target + Duration::days(end_offset),
    )
}

fn days_in_month(date: NaiveDate) -> u32 {
    let (year, month) = if date.month() == 12 {
        (date.year() + 1, 1)
    } else {
        (date.year(), date.month() + 1)
    };
    NaiveDate::from_ymd_opt(year, month, 1)
        .and_then(|first| first.pred_opt())
        .map(|last| last.day())
        .unwrap_or(28)
}

fn previous_month_period(target: NaiveDate) -> Option<Period> {
    let first_of_month = NaiveDate::from_ymd_opt(target.year(), target.month(), 1)?;
    let end = first_of_month.pred_opt()?;
    let start = NaiveDate::from_ymd_opt(end.year(), end.month(), 1)?;
    Some(Period::new(start, end))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::models::{CalcRules, PeriodConfig};
    use chrono::Utc;
    use pretty_assertions::assert_eq;
    use uuid::Uuid;

    fn schedule(
        frequency: PaymentFrequency,
        payment_day: i32,
        config: PeriodConfig,
    ) -> PaymentSchedule {
        PaymentSchedule {
            id: Uuid::new_v4(),
            owner_id: None,
            object_id: None,
            name: "test".to_string(),
            frequency,
            payment_day,
            period_config: sqlx::types::Json(config),
            is_custom: false,
            is_active: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn date(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    fn offsets(start: i64, end: i64) -> PeriodConfig {
        PeriodConfig {
            start_offset: Some(start),
            end_offset: Some(end),
            ..Default::default()
        }
    }

    #[test]
    fn daily_always_matches() {
        let schedule = schedule(PaymentFrequency::Daily, 1, offsets(-1, -1));
        let period = resolve(&schedule, date("2025-10-21")).unwrap();
        assert_eq!(period, Period::new(date("2025-10-20"), date("2025-10-20")));
    }

    #[test]
    fn weekly_matches_only_on_payment_weekday() {
        // payment_day 2 is Tuesday
        let schedule = schedule(PaymentFrequency::Weekly, 2, offsets(-22, -16));

        let tuesday = date("2025-10-21");
        let period = resolve(&schedule, tuesday).unwrap();
        assert_eq!(period, Period::new(date("2025-09-29"), date("2025-10-05")));

        let wednesday = date("2025-10-22");
        assert_eq!(resolve(&schedule, wednesday), None);
    }

    #[test]
    fn biweekly_uses_weekday_matching() {
        let schedule = schedule(PaymentFrequency::Biweekly, 5, offsets(-27, -14));
        // 2025-10-24 is a Friday
        let period = resolve(&schedule, date("2025-10-24")).unwrap();
        assert_eq!(period, Period::new(date("2025-09-27"), date("2025-10-10")));
        assert_eq!(resolve(&schedule, date("2025-10-23")), None);
    }

    #[test]
    fn legacy_monthly_matches_on_day_of_month() {
        let schedule = schedule(PaymentFrequency::Monthly, 10, offsets(-40, -11));
        let period = resolve(&schedule, date("2025-10-10")).unwrap();
        assert_eq!(period, Period::new(date("2025-08-31"), date("2025-09-29")));
        assert_eq!(resolve(&schedule, date("2025-10-11")), None);
    }

    #[test]
    fn legacy_monthly_previous_month_override_ignores_offsets() {
        let config = PeriodConfig {
            start_offset: Some(-40),
            end_offset: Some(-11),
            calc_rules: Some(CalcRules {
                period: Some("previous_month".to_string()),
            }),
            ..Default::default()
        };
        let schedule = schedule(PaymentFrequency::Monthly, 5, config);

        let period = resolve(&schedule, date("2025-03-05")).unwrap();
        assert_eq!(period, Period::new(date("2025-02-01"), date("2025-02-28")));
    }

    #[test]
    fn legacy_monthly_clamps_to_short_months() {
        let schedule = schedule(PaymentFrequency::Monthly, 31, offsets(-30, -1));
        // February: day 31 pays on the 28th
        assert!(resolve(&schedule, date("2025-02-28")).is_some());
        assert_eq!(resolve(&schedule, date("2025-02-27")), None);
        // Months with 31 days keep the configured day
        assert!(resolve(&schedule, date("2025-03-31")).is_some());
        assert_eq!(resolve(&schedule, date("2025-03-30")), None);
    }

    #[test]
    fn monthly_event_contained_in_month_matches() {
        let config = PeriodConfig {
            payment_events: Some(vec![PaymentEvent {
                start_offset: -14,
                end_offset: -1,
                is_end_of_month: false,
                is_start_of_month: false,
                next_payment_date: None,
            }]),
            ..Default::default()
        };
        let schedule = schedule(PaymentFrequency::Monthly, 15, config);

        // Offsets from the 15th stay inside October
        let period = resolve(&schedule, date("2025-10-15")).unwrap();
        assert_eq!(period, Period::new(date("2025-10-01"), date("2025-10-14")));

        // From the 5th the period would start in September; no match
        assert_eq!(resolve(&schedule, date("2025-10-05")), None);
    }

    #[test]
    fn end_of_month_event_takes_day_from_next_payment_date() {
        let config = PeriodConfig {
            payment_events: Some(vec![PaymentEvent {
                start_offset: -15,
                end_offset: -1,
                is_end_of_month: true,
                is_start_of_month: false,
                next_payment_date: Some(date("2025-11-30")),
            }]),
            ..Default::default()
        };
        let schedule = schedule(PaymentFrequency::Monthly, 15, config);

        let period = resolve(&schedule, date("2025-10-30")).unwrap();
        assert_eq!(period, Period::new(date("2025-10-15"), date("2025-10-29")));
        assert_eq!(resolve(&schedule, date("2025-10-29")), None);
    }

    #[test]
    fn end_of_month_event_with_start_flag_uses_base_payment_day() {
        let config = PeriodConfig {
            payment_events: Some(vec![PaymentEvent {
                start_offset: -10,
                end_offset: -1,
                is_end_of_month: true,
                is_start_of_month: true,
                next_payment_date: None,
            }]),
            ..Default::default()
        };
        let schedule = schedule(PaymentFrequency::Monthly, 31, config);

        // Clamped to the 30th in November
        assert!(resolve(&schedule, date("2025-11-30")).is_some());
        assert_eq!(resolve(&schedule, date("2025-11-29")), None);
    }

    #[test]
    fn monthly_events_with_no_match_return_none() {
        let config = PeriodConfig {
            payment_events: Some(vec![
                PaymentEvent {
                    start_offset: -45,
                    end_offset: -31,
                    is_end_of_month: false,
                    is_start_of_month: false,
                    next_payment_date: None,
                },
                PaymentEvent {
                    start_offset: -60,
                    end_offset: -46,
                    is_end_of_month: false,
                    is_start_of_month: false,
                    next_payment_date: None,
                },
            ]),
            ..Default::default()
        };
        let schedule = schedule(PaymentFrequency::Monthly, 15, config);

        // Both events push the period outside the month: not a payment day.
        assert_eq!(resolve(&schedule, date("2025-10-15")), None);
    }
}
