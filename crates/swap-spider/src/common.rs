use serde::de::{self, Deserializer, Visitor};

/// Left-pad a CIK to the 10 digits EDGAR uses in its file names.
///
/// Returns `None` when `raw` is empty or not a number.
pub(crate) fn pad_cik(raw: &str) -> Option<String> {
    let raw = raw.trim();
    if raw.is_empty() || !raw.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    Some(format!("{:0>10}", raw.trim_start_matches('0')))
}

/// The CIK as EDGAR's archive paths expect it: no leading zeros.
pub(crate) fn strip_cik(cik: &str) -> &str {
    let stripped = cik.trim_start_matches('0');
    if stripped.is_empty() {
        "0"
    } else {
        stripped
    }
}

/// Deserialize a CIK given either as a number (`1424958`) or a string (`"0001424958"`),
/// into the 10 digit, zero padded form.
pub(crate) fn de_cik<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    struct CikVisitor;

    impl<'de> Visitor<'de> for CikVisitor {
        type Value = String;

        fn expecting(&self, formatter: &mut std::fmt::Formatter) -> std::fmt::Result {
            formatter.write_str("a CIK number or numeric string")
        }

        fn visit_u64<E: de::Error>(self, value: u64) -> Result<Self::Value, E> {
            Ok(format!("{value:0>10}"))
        }

        fn visit_i64<E: de::Error>(self, value: i64) -> Result<Self::Value, E> {
            if value < 0 {
                return Err(E::custom(format!("negative CIK {value}")));
            }
            Ok(format!("{value:0>10}"))
        }

        fn visit_str<E: de::Error>(self, value: &str) -> Result<Self::Value, E> {
            pad_cik(value).ok_or_else(|| E::custom(format!("invalid CIK \"{value}\"")))
        }
    }

    deserializer.deserialize_any(CikVisitor)
}
