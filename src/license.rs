//! Creative Commons license resolution for iNaturalist photo license codes.

const CC_LICENSES_BASE: &str = "https://creativecommons.org/licenses/";
const CC0_DEED: &str = "https://creativecommons.org/publicdomain/zero/1.0/";

/// Human-readable license name for a photo license code.
///
/// Lookup is case-insensitive. Unknown codes are shown upper-cased.
pub fn license_name(code: &str) -> String {
    let name = match code.to_lowercase().as_str() {
        "cc-by" => "CC BY",
        "cc-by-nc" => "CC BY-NC",
        "cc-by-sa" => "CC BY-SA",
        "cc-by-nd" => "CC BY-ND",
        "cc-by-nc-sa" => "CC BY-NC-SA",
        "cc-by-nc-nd" => "CC BY-NC-ND",
        "cc0" => "CC0 (Public Domain)",
        _ => return code.to_uppercase(),
    };
    name.to_string()
}

/// Canonical deed URL for a license code.
///
/// `cc0` points at the public-domain dedication; everything else is
/// templated as a 4.0 license with the `cc-` prefix removed.
pub fn license_url(code: &str) -> String {
    let code = code.to_lowercase();
    if code == "cc0" {
        return CC0_DEED.to_string();
    }
    format!("{}{}/4.0/", CC_LICENSES_BASE, code.replace("cc-", ""))
}
