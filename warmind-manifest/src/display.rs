//! Display-property normalization.

use warmind_types::{DisplayProperties, RawDefinition, UNKNOWN_NAME, value_at};

/// Joins a root-relative content path onto `host`.
///
/// Missing or blank paths stay `None`; paths that are already absolute are
/// returned untouched so processing a processed record is a no-op.
pub fn absolute_url(host: &str, path: Option<&str>) -> Option<String> {
    let path = path.map(str::trim).filter(|p| !p.is_empty())?;

    if path.starts_with("https://") || path.starts_with("http://") {
        return Some(path.to_string());
    }

    let host = host.trim_end_matches('/');
    if path.starts_with('/') {
        Some(format!("{host}{path}"))
    } else {
        Some(format!("{host}/{path}"))
    }
}

/// Builds normalized display properties for a raw record.
pub fn display_properties(raw: &RawDefinition, host: &str) -> DisplayProperties {
    let text = |pointer: &str| value_at(raw, pointer).and_then(|v| v.as_str());

    let name = text("/displayProperties/name")
        .filter(|n| !n.trim().is_empty())
        .unwrap_or(UNKNOWN_NAME)
        .to_string();
    let description = text("/displayProperties/description")
        .unwrap_or_default()
        .to_string();
    let icon = absolute_url(host, text("/displayProperties/icon"));

    DisplayProperties {
        name,
        description,
        has_icon: icon.is_some(),
        icon,
        icon_watermark: absolute_url(host, text("/iconWatermark")),
        icon_watermark_shelved: absolute_url(host, text("/iconWatermarkShelved")),
        screenshot: absolute_url(host, text("/screenshot")),
    }
}
