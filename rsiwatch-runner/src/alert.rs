//! Alert composition from per-timeframe evaluations.
//!
//! Two message shapes:
//! - single timeframe: one fixed sentence naming the timeframe and instrument
//! - multi timeframe: a heading line, a blank line, then one line per breach
//!
//! Values are printed with shortest round-trip formatting (`30`, `27.5`).

use rsiwatch_core::domain::Instrument;
use rsiwatch_core::TimeframeEvaluation;
use serde::Serialize;

/// What, if anything, to send at the end of a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AlertDecision {
    pub subject: String,
    pub body: String,
    pub should_send: bool,
}

/// One breach line for the multi-timeframe body.
pub fn breach_line(eval: &TimeframeEvaluation, threshold: f64) -> String {
    format!(
        "{label} RSI has fallen below {threshold}. Current {label} RSI: {value}",
        label = eval.label,
        value = eval.latest_rsi,
    )
}

pub fn compose(
    instrument: &Instrument,
    evaluations: &[TimeframeEvaluation],
    threshold: f64,
) -> AlertDecision {
    let subject = format!("{} RSI Alert", instrument.display_name);
    let should_send = evaluations.iter().any(|e| e.breached);

    let body = match evaluations {
        _ if !should_send => String::new(),
        [only] => format!(
            "The {} RSI of {} has fallen below {threshold}. Current RSI: {}",
            only.label.to_lowercase(),
            instrument.display_name,
            only.latest_rsi,
        ),
        _ => {
            let mut body = format!(
                "{} ({}) RSI Alert:\n\n",
                instrument.display_name, instrument.symbol
            );
            for eval in evaluations.iter().filter(|e| e.breached) {
                body.push_str(&breach_line(eval, threshold));
                body.push('\n');
            }
            body
        }
    };

    AlertDecision {
        subject,
        body,
        should_send,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn eval(label: &str, rsi: f64, threshold: f64) -> TimeframeEvaluation {
        TimeframeEvaluation {
            label: label.into(),
            latest_rsi: rsi,
            breached: rsi < threshold,
        }
    }

    #[test]
    fn single_timeframe_uses_fixed_sentence() {
        let btc = Instrument::new("BTC-USD", "Bitcoin");
        let d = compose(&btc, &[eval("Monthly", 27.5, 30.0)], 30.0);
        assert!(d.should_send);
        assert_eq!(d.subject, "Bitcoin RSI Alert");
        assert_eq!(
            d.body,
            "The monthly RSI of Bitcoin has fallen below 30. Current RSI: 27.5"
        );
    }

    #[test]
    fn multi_timeframe_lists_only_breaches() {
        let aapl = Instrument::new("AAPL", "Apple Inc.");
        let evals = [
            eval("Monthly", 45.0, 30.0),
            eval("Weekly", 28.25, 30.0),
            eval("Daily", 31.0, 30.0),
        ];
        let d = compose(&aapl, &evals, 30.0);
        assert!(d.should_send);
        assert_eq!(d.subject, "Apple Inc. RSI Alert");
        assert_eq!(
            d.body,
            "Apple Inc. (AAPL) RSI Alert:\n\n\
             Weekly RSI has fallen below 30. Current Weekly RSI: 28.25\n"
        );
        assert!(!d.body.contains("Monthly"));
        assert!(!d.body.contains("Daily"));
    }

    #[test]
    fn multi_timeframe_keeps_evaluation_order() {
        let inst = Instrument::bare("7203.T");
        let evals = [eval("Monthly", 10.0, 30.0), eval("Daily", 20.0, 30.0)];
        let d = compose(&inst, &evals, 30.0);
        let lines: Vec<&str> = d.body.lines().skip(2).collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("Monthly"));
        assert!(lines[1].starts_with("Daily"));
    }

    #[test]
    fn no_breach_means_no_send() {
        let inst = Instrument::bare("AAPL");
        let d = compose(&inst, &[eval("Monthly", 55.0, 30.0), eval("Weekly", 30.0, 30.0)], 30.0);
        assert!(!d.should_send);
        assert!(d.body.is_empty());

        let single = compose(&inst, &[eval("Monthly", 55.0, 30.0)], 30.0);
        assert!(!single.should_send);
        assert!(single.body.is_empty());
    }

    #[test]
    fn empty_evaluations_never_send() {
        let d = compose(&Instrument::bare("X"), &[], 30.0);
        assert!(!d.should_send);
    }

    mod props {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn multi_body_has_one_line_per_breach(
                values in proptest::collection::vec(0.0f64..100.0, 2..6),
                threshold in 1.0f64..99.0,
            ) {
                let evals: Vec<_> = values
                    .iter()
                    .enumerate()
                    .map(|(i, v)| eval(&format!("TF{i}"), *v, threshold))
                    .collect();
                let breaches = evals.iter().filter(|e| e.breached).count();
                let d = compose(&Instrument::bare("SYM"), &evals, threshold);

                prop_assert_eq!(d.should_send, breaches > 0);
                let lines = d.body.lines().filter(|l| l.contains("RSI has fallen below")).count();
                prop_assert_eq!(lines, breaches);
            }
        }
    }
}
