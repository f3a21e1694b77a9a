//! Mapping of chromiumoxide errors onto driver errors

use chromiumoxide::error::CdpError;
use storefront_core_types::DriverError;

/// Classify a CDP failure.
pub fn map_cdp_error(err: CdpError) -> DriverError {
    if matches!(err, CdpError::Timeout) {
        return DriverError::Timeout(err.to_string());
    }
    classify_message(err.to_string())
}

pub(crate) fn classify_message(message: String) -> DriverError {
    let lower = message.to_lowercase();
    if lower.contains("no node")
        || lower.contains("could not find node")
        || lower.contains("detached")
        || lower.contains("cannot find context")
        || lower.contains("object reference chain is too long")
    {
        DriverError::StaleElement(message)
    } else if lower.contains("not a valid selector")
        || lower.contains("is not a valid xpath")
        || lower.contains("syntaxerror")
    {
        DriverError::InvalidSelector(message)
    } else if lower.contains("target closed")
        || lower.contains("session closed")
        || lower.contains("channel")
        || lower.contains("websocket")
    {
        DriverError::Closed(message)
    } else if lower.contains("box model")
        || lower.contains("not visible")
        || lower.contains("not clickable")
        || lower.contains("intercept")
    {
        DriverError::NotInteractable(message)
    } else if lower.contains("timeout") || lower.contains("timed out") {
        DriverError::Timeout(message)
    } else {
        DriverError::Protocol(message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_map_to_driver_errors() {
        assert!(matches!(
            classify_message("Could not find node with given id".into()),
            DriverError::StaleElement(_)
        ));
        assert!(matches!(
            classify_message("DOM Error while querying: 'h1.md:flex' is not a valid selector".into()),
            DriverError::InvalidSelector(_)
        ));
        assert!(matches!(
            classify_message("Could not compute box model.".into()),
            DriverError::NotInteractable(_)
        ));
        assert!(matches!(
            classify_message("Target closed".into()),
            DriverError::Closed(_)
        ));
        assert!(matches!(
            classify_message("Internal error".into()),
            DriverError::Protocol(_)
        ));
    }

    #[test]
    fn request_timeout_is_transient() {
        assert!(map_cdp_error(CdpError::Timeout).is_transient());
    }
}
