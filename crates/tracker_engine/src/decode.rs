use chardetng::EncodingDetector;
use encoding_rs::{Encoding, UTF_8};
use tracker_logging::tracker_warn;

/// Fetched body as text, with the encoding that was used to read it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedBody {
    pub text: String,
    pub encoding_label: String,
    /// Some byte sequences were invalid and replaced with U+FFFD.
    pub had_errors: bool,
}

/// Decodes a fetched body, trying in turn: BOM, Content-Type charset, byte sniffing.
///
/// Invalid sequences are replaced rather than rejected so that a page with a few
/// broken bytes can still be fingerprinted; the replacement is deterministic.
pub fn decode_body(bytes: &[u8], content_type: Option<&str>) -> DecodedBody {
    let encoding = Encoding::for_bom(bytes)
        .map(|(encoding, _)| encoding)
        .or_else(|| {
            content_type
                .and_then(charset_from_content_type)
                .and_then(|label| Encoding::for_label(label.as_bytes()))
        })
        .unwrap_or_else(|| sniff(bytes));

    let (text, used, had_errors) = encoding.decode(bytes);
    if had_errors {
        tracker_warn!(
            "Body contained invalid {} sequences; replaced with U+FFFD",
            used.name()
        );
    }
    DecodedBody {
        text: text.into_owned(),
        encoding_label: used.name().to_string(),
        had_errors,
    }
}

fn sniff(bytes: &[u8]) -> &'static Encoding {
    if std::str::from_utf8(bytes).is_ok() {
        return UTF_8;
    }
    let mut detector = EncodingDetector::new();
    detector.feed(bytes, true);
    detector.guess(None, true)
}

fn charset_from_content_type(content_type: &str) -> Option<String> {
    content_type.split(';').skip(1).find_map(|param| {
        let (key, value) = param.split_once('=')?;
        key.trim()
            .eq_ignore_ascii_case("charset")
            .then(|| value.trim().trim_matches(&['"', '\''][..]).to_string())
    })
}
