//! Tests for loan arithmetic.

use super::*;
use chrono::TimeZone;

fn assert_close(actual: f64, expected: f64) {
    assert!(
        (actual - expected).abs() <= 0.01,
        "expected {} ± 0.01, got {}",
        expected,
        actual
    );
}

mod monthly_payment_tests {
    use super::*;

    /// Verify the standard amortizing payment for a one-year loan.
    #[test]
    fn test_standard_loan() {
        assert_close(monthly_payment(10_000.0, 5.0, 12), 856.07);
    }

    /// Verify a 30-year mortgage-sized loan.
    #[test]
    fn test_long_term_loan() {
        assert_close(monthly_payment(100_000.0, 6.0, 360), 599.55);
    }

    /// Verify that a zero rate splits the principal evenly.
    #[test]
    fn test_zero_rate_divides_evenly() {
        assert_eq!(monthly_payment(12_000.0, 0.0, 12), 1000.00);
        assert_eq!(monthly_payment(10_000.0, 0.0, 12), 833.33);
    }

    #[test]
    fn test_degenerate_inputs_return_zero() {
        assert_eq!(monthly_payment(0.0, 5.0, 12), 0.0);
        assert_eq!(monthly_payment(-500.0, 5.0, 12), 0.0);
        assert_eq!(monthly_payment(10_000.0, 5.0, 0), 0.0);
    }
}

mod interest_tests {
    use super::*;

    #[test]
    fn test_total_interest() {
        assert_close(total_interest(10_000.0, 5.0, 12), 272.84);
        assert_eq!(total_interest(12_000.0, 0.0, 12), 0.0);
    }

    #[test]
    fn test_accrued_interest() {
        assert_close(accrued_interest(10_000.0, 5.0, 30), 41.10);
    }

    /// Verify that zero elapsed days accrue exactly nothing.
    #[test]
    fn test_accrued_interest_zero_days() {
        assert_eq!(accrued_interest(10_000.0, 5.0, 0), 0.0);
    }

    #[test]
    fn test_payoff_amount() {
        assert_close(payoff_amount(1_000.0, 0.0005, 30), 1_015.00);
        assert_eq!(payoff_amount(1_000.0, 0.0005, 0), 1_000.00);
    }

    /// Verify payoff grows with every additional day for a positive balance and rate.
    #[test]
    fn test_payoff_amount_increases_with_days() {
        let mut previous = payoff_amount(5_000.0, 0.0002, 0);
        for days in 1..60 {
            let next = payoff_amount(5_000.0, 0.0002, days);
            assert!(next > previous, "day {} did not increase payoff", days);
            previous = next;
        }
    }

    #[test]
    fn test_approximate_apr() {
        assert_close(approximate_apr(10_000.0, 5.0, 12, 0.0), 5.46);
        assert_close(approximate_apr(10_000.0, 5.0, 12, 100.0), 7.46);
        assert_eq!(approximate_apr(0.0, 5.0, 12, 100.0), 0.0);
    }
}

mod amortization_schedule_tests {
    use super::*;

    /// Verify row count, monotonic balances and full payoff.
    #[test]
    fn test_schedule_retires_balance() {
        let schedule = amortization_schedule(10_000.0, 5.0, 12);

        assert_eq!(schedule.len(), 12);
        for pair in schedule.windows(2) {
            assert!(pair[1].balance <= pair[0].balance);
        }

        let last = schedule.last().unwrap();
        assert_eq!(last.period, 12);
        assert!(last.balance.abs() <= 0.01);
    }

    /// Verify that every row's payment is the sum of its components.
    #[test]
    fn test_payment_equals_principal_plus_interest() {
        for row in amortization_schedule(25_000.0, 7.25, 60) {
            assert_close(row.payment, row.principal + row.interest);
        }
    }

    #[test]
    fn test_periods_are_one_based() {
        let schedule = amortization_schedule(1_200.0, 3.0, 6);
        let periods: Vec<u32> = schedule.iter().map(|r| r.period).collect();
        assert_eq!(periods, vec![1, 2, 3, 4, 5, 6]);
    }

    /// Verify the first period splits the flat payment into interest and principal.
    #[test]
    fn test_first_row_components() {
        let first = amortization_schedule(10_000.0, 5.0, 12)[0];

        assert_close(first.interest, 41.67);
        assert_close(first.principal, 814.40);
        assert_close(first.payment, 856.07);
        assert_close(first.balance, 9_185.60);
    }

    /// Verify the final row absorbs rounding drift so principals sum to the loan amount.
    #[test]
    fn test_principal_sums_to_loan_amount() {
        let schedule = amortization_schedule(10_000.0, 0.0, 12);
        let repaid: f64 = schedule.iter().map(|r| r.principal).sum();

        assert_close(repaid, 10_000.0);
        assert_close(schedule[11].payment, 833.37);
    }

    #[test]
    fn test_degenerate_loan_has_empty_schedule() {
        assert!(amortization_schedule(0.0, 5.0, 12).is_empty());
        assert!(amortization_schedule(1_000.0, 5.0, 0).is_empty());
    }
}

mod revolving_credit_tests {
    use super::*;

    #[test]
    fn test_minimum_payment_uses_interest_plus_one_percent() {
        assert_close(minimum_payment(10_000.0, 2.0, DEFAULT_MINIMUM_PAYMENT), 116.67);
    }

    /// Verify that healthy small balances still pay the floor.
    #[test]
    fn test_minimum_payment_floor() {
        assert_eq!(minimum_payment(100.0, 2.0, DEFAULT_MINIMUM_PAYMENT), 25.0);
    }

    /// Verify that the minimum never exceeds a balance below the floor.
    #[test]
    fn test_minimum_payment_capped_by_balance() {
        assert_eq!(minimum_payment(10.0, 2.0, DEFAULT_MINIMUM_PAYMENT), 10.0);
        assert_eq!(minimum_payment(0.0, 2.0, DEFAULT_MINIMUM_PAYMENT), 0.0);
    }

    #[test]
    fn test_available_credit() {
        assert_eq!(available_credit(10_000.0, 2_500.0), 7_500.0);
        assert_eq!(available_credit(10_000.0, 12_000.0), 0.0);
    }

    /// Verify that an over-limit balance reports utilization above 1.0.
    #[test]
    fn test_utilization_not_capped() {
        assert_eq!(utilization(12_000.0, 10_000.0), 1.2);
        assert_eq!(utilization(2_500.0, 10_000.0), 0.25);
        assert_eq!(utilization(100.0, 0.0), 0.0);
    }
}

mod delinquency_tests {
    use super::*;

    #[test]
    fn test_days_past_due() {
        let due = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let now = Utc.with_ymd_and_hms(2024, 1, 31, 12, 0, 0).unwrap();

        assert_eq!(days_past_due(due, now), 30);
    }

    #[test]
    fn test_days_past_due_future_date_is_zero() {
        let due = Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap();
        let now = Utc.with_ymd_and_hms(2024, 1, 31, 12, 0, 0).unwrap();

        assert_eq!(days_past_due(due, now), 0);
    }

    #[test]
    fn test_status_buckets() {
        assert_eq!(DelinquencyStatus::from_days_past_due(0), DelinquencyStatus::Current);
        assert_eq!(DelinquencyStatus::from_days_past_due(1), DelinquencyStatus::Delinquent30);
        assert_eq!(DelinquencyStatus::from_days_past_due(30), DelinquencyStatus::Delinquent30);
        assert_eq!(DelinquencyStatus::from_days_past_due(31), DelinquencyStatus::Delinquent60);
        assert_eq!(DelinquencyStatus::from_days_past_due(90), DelinquencyStatus::Delinquent90);
        assert_eq!(DelinquencyStatus::from_days_past_due(120), DelinquencyStatus::Delinquent120);
        assert_eq!(DelinquencyStatus::from_days_past_due(121), DelinquencyStatus::Default);
    }

    #[test]
    fn test_status_serializes_as_snake_case_label() {
        let json = serde_json::to_string(&DelinquencyStatus::Delinquent60).unwrap();
        assert_eq!(json, "\"delinquent_60\"");
        assert_eq!(DelinquencyStatus::Default.to_string(), "default");
    }
}

mod validation_tests {
    use super::*;

    #[test]
    fn test_valid_parameters() {
        let result = validate_loan_parameters(10_000.0, 0.05, 12);
        assert!(result.valid);
        assert!(result.errors.is_empty());
    }

    /// Verify that every failing parameter contributes its own message.
    #[test]
    fn test_all_errors_accumulate() {
        let result = validate_loan_parameters(0.0, 1.5, 0);

        assert!(!result.valid);
        assert_eq!(result.errors.len(), 3);
        assert!(result.errors[0].contains("Principal"));
        assert!(result.errors[1].contains("Interest rate"));
        assert!(result.errors[2].contains("Term"));
    }

    #[test]
    fn test_rate_and_term_boundaries() {
        assert!(validate_loan_parameters(1.0, 0.0, 1).valid);
        assert!(validate_loan_parameters(1.0, 1.0, 360).valid);
        assert!(!validate_loan_parameters(1.0, -0.01, 12).valid);
        assert!(!validate_loan_parameters(1.0, 0.05, 361).valid);
    }

    #[test]
    fn test_loan_terms_accepts_percent_rate() {
        let loan = LoanTerms::new(10_000.0, 5.0, 12).unwrap();

        assert_close(loan.monthly_payment(), 856.07);
        assert_close(loan.total_interest(), 272.84);
        assert_eq!(loan.schedule().len(), 12);
        assert_close(loan.apr(0.0), 5.46);
    }

    #[test]
    fn test_loan_terms_rejects_first_invalid_field() {
        let err = LoanTerms::new(10_000.0, 150.0, 12).unwrap_err();
        assert!(matches!(err, ValidationError::OutOfRange { ref field, .. } if field == "rate"));

        let err = LoanTerms::new(10_000.0, 5.0, 0).unwrap_err();
        assert!(matches!(err, ValidationError::OutOfRange { ref field, .. } if field == "term_months"));
    }
}
