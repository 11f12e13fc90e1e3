use crate::types::Outcome;
use std::fmt;

pub fn status_text(permit_valid: bool) -> &'static str {
    if permit_valid {
        "VALID PERMIT"
    } else {
        "NO VALID PERMIT"
    }
}

/// Plain-text results screen for an Outcome.
pub struct ResultsCard<'a>(pub &'a Outcome);

impl<'a> fmt::Display for ResultsCard<'a> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let outcome = self.0;
        writeln!(f, "LICENSE PLATE: {}", outcome.plate_text().unwrap_or("N/A"))?;
        writeln!(f, "{}", status_text(outcome.permit_valid()))?;
        writeln!(f, "Photo: {}", outcome.image_uri())?;
        if let Some(error) = outcome.error_message() {
            writeln!(f, "Error: {}", error)?;
        }
        Ok(())
    }
}
