//! List command handler

use crate::commands::ListArgs;
use crate::error::CliResult;
use crate::output::OutputFormat;
use serde::Serialize;
use storeprobe::{Journey, Suite};

#[derive(Debug, Serialize)]
struct ListedJourney {
    id: Journey,
    name: &'static str,
}

#[derive(Debug, Serialize)]
struct ListedSuite {
    suite: &'static str,
    journeys: Vec<ListedJourney>,
}

fn listing(suites: &[Suite]) -> Vec<ListedSuite> {
    suites
        .iter()
        .map(|suite| ListedSuite {
            suite: suite.as_str(),
            journeys: suite
                .journeys()
                .into_iter()
                .map(|id| ListedJourney {
                    id,
                    name: id.name(),
                })
                .collect(),
        })
        .collect()
}

/// Execute the list command
pub fn execute_list(args: &ListArgs) -> CliResult<()> {
    let suites = match args.suite {
        Some(suite) => vec![suite.into()],
        None => Suite::ALL.to_vec(),
    };
    let text = match args.format {
        OutputFormat::Text => render_journey_list(&suites),
        OutputFormat::Json => render_journey_list_json(&suites)?,
    };
    println!("{text}");
    Ok(())
}

/// Journeys grouped by suite, one title per line
#[must_use]
pub fn render_journey_list(suites: &[Suite]) -> String {
    let mut out = String::new();
    for group in listing(suites) {
        out.push_str(&format!("{} ({})\n", group.suite, group.journeys.len()));
        for journey in group.journeys {
            out.push_str(&format!("  {}\n", journey.name));
        }
    }
    out.trim_end().to_string()
}

/// Journeys grouped by suite as pretty JSON
pub fn render_journey_list_json(suites: &[Suite]) -> CliResult<String> {
    Ok(serde_json::to_string_pretty(&listing(suites))?)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_text_listing_groups_by_suite() {
        let text = render_journey_list(&[Suite::Checkout]);
        assert_eq!(
            text,
            "checkout (2)\n  Guest Purchase\n  Checkout with Product Variants"
        );
    }

    #[test]
    fn test_full_listing_names_every_journey() {
        let text = render_journey_list(&Suite::ALL);
        for journey in Journey::ALL {
            assert!(text.contains(journey.name()), "{} missing", journey.name());
        }
    }

    #[test]
    fn test_json_listing() {
        let json = render_journey_list_json(&[Suite::CodegenValidation]).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value[0]["suite"], "codegen");
        assert_eq!(value[0]["journeys"].as_array().unwrap().len(), 3);
        assert_eq!(value[0]["journeys"][0]["id"], "search-locators");
    }
}
