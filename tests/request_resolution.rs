//! Behavior-driven tests for request resolution.
//!
//! These tests verify HOW a loosely-typed request becomes a history page
//! query: alias defaults, mode priority, date handling, and rejection of
//! anything outside the recognized vocabulary.

use pricehist_core::{
    resolve_request, DeferredSpan, QueryWindow, RequestError, RequestMap, DEFAULT_BASE_URL,
};
use serde_json::{json, Value};
use time::macros::datetime;
use time::OffsetDateTime;

const NOW: OffsetDateTime = datetime!(2024-06-15 12:00 UTC);

fn request(value: Value) -> RequestMap {
    match value {
        Value::Object(map) => map,
        other => panic!("request fixtures must be objects, got {other}"),
    }
}

// =============================================================================
// Validation
// =============================================================================

#[test]
fn when_symbol_is_missing_or_unknown_keys_present_then_request_is_invalid() {
    // Given: requests that violate the recognized key set
    let cases = [
        json!({}),
        json!({"exchange": "NSE"}),
        json!({"symbol": "   "}),
        json!({"symbol": "TCS", "interval": "1d"}),
        json!({"symbol": "TCS", "startDate": "2024-01-01"}),
    ];

    for case in cases {
        // When: each is resolved
        let result = resolve_request(&request(case.clone()), NOW);

        // Then: resolution fails before anything else happens
        assert!(result.is_err(), "{case} should be rejected");
    }
}

#[test]
fn when_unknown_keys_are_present_then_message_lists_them_and_valid_keys() {
    // Given: a request with two misspelled keys
    let raw = request(json!({"symbol": "TCS", "spn": "1Y", "exchang": "BSE"}));

    // When: it is resolved
    let error = resolve_request(&raw, NOW).expect_err("unknown keys");

    // Then: the message names both offenders and the accepted vocabulary
    let message = error.to_string();
    assert!(message.contains("exchang"));
    assert!(message.contains("spn"));
    assert!(message.contains("end_date"));
}

#[test]
fn when_alias_values_are_outside_the_table_then_request_is_invalid() {
    let error = resolve_request(&request(json!({"symbol": "TCS", "exchange": "NYSE"})), NOW)
        .expect_err("unknown exchange");
    assert!(matches!(error, RequestError::InvalidExchange { .. }));

    let error = resolve_request(&request(json!({"symbol": "TCS", "frequency": "Hourly"})), NOW)
        .expect_err("unknown frequency");
    assert!(matches!(error, RequestError::InvalidFrequency { .. }));
}

#[test]
fn when_values_differ_from_their_labels_in_case_or_spacing_then_request_is_invalid() {
    // Given: span, exchange and frequency values that only approximate a label
    for span in ["max", " YTD", "1y"] {
        // When: each is resolved
        let error = resolve_request(&request(json!({"symbol": "TCS", "span": span})), NOW)
            .expect_err("inexact span");

        // Then: it is rejected instead of folded onto a known tag
        assert!(matches!(error, RequestError::InvalidSpan { .. }), "{span:?} gave {error:?}");
    }

    for exchange in ["nse", "Bse", "BSE "] {
        let error = resolve_request(&request(json!({"symbol": "TCS", "exchange": exchange})), NOW)
            .expect_err("inexact exchange");
        assert!(
            matches!(error, RequestError::InvalidExchange { .. }),
            "{exchange:?} gave {error:?}"
        );
    }

    for frequency in ["daily", "WEEKLY", " Monthly"] {
        let error =
            resolve_request(&request(json!({"symbol": "TCS", "frequency": frequency})), NOW)
                .expect_err("inexact frequency");
        assert!(
            matches!(error, RequestError::InvalidFrequency { .. }),
            "{frequency:?} gave {error:?}"
        );
    }
}

// =============================================================================
// Alias tables
// =============================================================================

#[test]
fn when_aliases_are_given_then_codes_follow_the_tables() {
    let cases = [
        ("NSE", "Daily", "NS", "1d"),
        ("BSE", "Weekly", "BO", "1wk"),
        ("BSE", "Monthly", "BO", "1mo"),
    ];

    for (exchange, frequency, exchange_code, frequency_code) in cases {
        let query = resolve_request(
            &request(json!({"symbol": "INFY", "exchange": exchange, "frequency": frequency})),
            NOW,
        )
        .expect("valid aliases");

        assert_eq!(query.exchange.code(), exchange_code);
        assert_eq!(query.frequency.code(), frequency_code);
    }
}

#[test]
fn when_aliases_are_absent_then_nse_daily_is_used() {
    let query = resolve_request(&request(json!({"symbol": "INFY"})), NOW).expect("valid");

    assert_eq!(query.ticker(), "INFY.NS");
    assert_eq!(query.frequency.code(), "1d");
}

// =============================================================================
// Modes
// =============================================================================

#[test]
fn when_start_date_has_no_end_then_end_is_now() {
    // Given: an explicit start with no end
    let raw = request(json!({"symbol": "TCS", "start_date": "2020-01-01"}));

    // When: resolved at a fixed instant
    let query = resolve_request(&raw, NOW).expect("valid");

    // Then: the window runs from midnight UTC to that instant
    assert_eq!(
        query.window,
        QueryWindow::Bounded {
            period1: 1_577_836_800,
            period2: NOW.unix_timestamp(),
        }
    );
}

#[test]
fn when_start_date_and_span_are_both_given_then_explicit_range_wins() {
    let query = resolve_request(
        &request(json!({"symbol": "TCS", "start_date": "2024-01-01", "span": "Max"})),
        NOW,
    )
    .expect("valid");

    let QueryWindow::Bounded { period1, .. } = query.window else {
        panic!("explicit range must produce bounds");
    };
    assert_eq!(period1, 1_704_067_200);
}

#[test]
fn when_end_date_comes_without_start_then_it_is_ignored() {
    let query = resolve_request(
        &request(json!({"symbol": "TCS", "end_date": "2024-01-01"})),
        NOW,
    )
    .expect("valid");

    assert_eq!(query.window, QueryWindow::Unbounded);
}

#[test]
fn when_span_is_max_then_window_starts_in_1980() {
    let query = resolve_request(&request(json!({"symbol": "TCS", "span": "Max"})), NOW)
        .expect("valid");

    assert_eq!(
        query.window,
        QueryWindow::Bounded {
            period1: 315_532_800,
            period2: NOW.unix_timestamp(),
        }
    );
}

#[test]
fn when_span_is_five_years_then_window_is_1825_days() {
    let query = resolve_request(&request(json!({"symbol": "TCS", "span": "5Y"})), NOW)
        .expect("valid");

    let QueryWindow::Bounded { period1, period2 } = query.window else {
        panic!("5Y must produce bounds");
    };
    assert_eq!(period2 - period1, 1_825 * 86_400);
}

#[test]
fn when_span_is_relative_then_filter_is_deferred_and_url_has_frequency_only() {
    for (tag, expected) in [
        ("1D", DeferredSpan::OneDay),
        ("5D", DeferredSpan::FiveDays),
        ("3M", DeferredSpan::ThreeMonths),
        ("6M", DeferredSpan::SixMonths),
        ("YTD", DeferredSpan::YearToDate),
        ("1Y", DeferredSpan::OneYear),
    ] {
        let query = resolve_request(&request(json!({"symbol": "TCS", "span": tag})), NOW)
            .expect("valid span");

        assert_eq!(query.window, QueryWindow::Deferred { span: expected });
        assert!(query
            .history_url(DEFAULT_BASE_URL)
            .ends_with("/quote/TCS.NS/history?frequency=1d"));
    }
}

#[test]
fn when_dates_are_malformed_then_request_is_invalid() {
    for bad in ["20-01-01", "2020-1-1", "2020-01-01T00:00:00", "Jan 1, 2020", ""] {
        let error = resolve_request(
            &request(json!({"symbol": "TCS", "start_date": bad})),
            NOW,
        )
        .expect_err("malformed date");
        assert!(
            matches!(error, RequestError::InvalidDate { .. }),
            "{bad:?} gave {error:?}"
        );
    }
}

// =============================================================================
// Determinism
// =============================================================================

#[test]
fn when_the_same_request_is_resolved_twice_then_results_are_identical() {
    let raw = request(json!({
        "symbol": "hdfcbank",
        "exchange": "BSE",
        "frequency": "Monthly",
        "start_date": "2019-03-31"
    }));

    let first = resolve_request(&raw, NOW).expect("valid");
    let second = resolve_request(&raw, NOW).expect("valid");

    assert_eq!(first, second);
    assert_eq!(
        first.history_url(DEFAULT_BASE_URL),
        format!(
            "https://finance.yahoo.com/quote/HDFCBANK.BO/history?period1=1553990400&period2={}&frequency=1mo",
            NOW.unix_timestamp()
        )
    );
}
