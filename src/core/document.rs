//! Decoding of daily rate publications into observations
//!
//! Publications are XML documents of the form
//!
//! ```xml
//! <?xml version="1.0" encoding="windows-1251"?>
//! <ValCurs Date="01.03.2024" name="Foreign Currency Market">
//!   <Valute ID="R01235">
//!     <NumCode>840</NumCode>
//!     <CharCode>USD</CharCode>
//!     <Nominal>1</Nominal>
//!     <Name>US Dollar</Name>
//!     <Value>91,3336</Value>
//!     <VunitRate>91,3336</VunitRate>
//!   </Valute>
//! </ValCurs>
//! ```
//!
//! The declared encoding is frequently a legacy single-byte code page, so the
//! payload is transcoded to UTF-8 before it is deserialized.

use super::error::RatesError;
use super::observation::{Observation, parse_rate};
use super::provider::RawDocument;
use chrono::NaiveDate;
use encoding_rs::{Encoding, UTF_8};
use quick_xml::Reader;
use quick_xml::events::Event;
use serde::Deserialize;
use tracing::debug;

const PUBLICATION_DATE_FORMAT: &str = "%d.%m.%Y";

#[derive(Debug, Deserialize)]
struct ValCurs {
    #[serde(rename = "@Date")]
    date: String,
    #[serde(rename = "Valute", default)]
    valutes: Vec<Valute>,
}

#[derive(Debug, Deserialize)]
struct Valute {
    #[serde(rename = "NumCode", default)]
    num_code: String,
    #[serde(rename = "CharCode")]
    char_code: String,
    #[serde(rename = "Nominal")]
    nominal: u32,
    #[serde(rename = "Name")]
    name: String,
    #[serde(rename = "Value")]
    value: String,
    #[serde(rename = "VunitRate", default)]
    vunit_rate: Option<String>,
}

/// Decodes one day's publication.
///
/// All-or-nothing: a structural error or a single malformed rate rejects
/// the whole document. Every observation is stamped with the requested day,
/// not the publication date found inside the document.
pub fn parse_document(document: RawDocument) -> Result<Vec<Observation>, RatesError> {
    let day = document.day;
    let text = transcode(day, &document.bytes)?;

    let curs: ValCurs = quick_xml::de::from_str(&text)
        .map_err(|e| RatesError::decode(day, format!("malformed publication: {e}")))?;

    match NaiveDate::parse_from_str(curs.date.trim(), PUBLICATION_DATE_FORMAT) {
        Ok(published) if published != day => {
            debug!(%day, %published, "Publication date differs from requested day");
        }
        Ok(_) => {}
        Err(e) => debug!(%day, date = %curs.date, "Unparseable publication date: {e}"),
    }

    curs.valutes
        .into_iter()
        .map(|valute| to_observation(day, valute))
        .collect()
}

fn to_observation(day: NaiveDate, valute: Valute) -> Result<Observation, RatesError> {
    let rate = parse_field(day, "Value", &valute.value)?;
    let unit_rate = match valute.vunit_rate.as_deref() {
        Some(text) => parse_field(day, "VunitRate", text)?,
        None if valute.nominal > 0 => rate / f64::from(valute.nominal),
        None => {
            return Err(RatesError::decode(
                day,
                format!("zero nominal for {}", valute.char_code),
            ));
        }
    };

    Ok(Observation {
        code: valute.char_code.trim().to_string(),
        num_code: valute.num_code.trim().to_string(),
        name: valute.name.trim().to_string(),
        nominal: valute.nominal,
        rate,
        unit_rate,
        day,
    })
}

fn parse_field(day: NaiveDate, field: &'static str, text: &str) -> Result<f64, RatesError> {
    parse_rate(text).map_err(|source| RatesError::NumericParse {
        day,
        field,
        text: text.to_string(),
        source,
    })
}

fn transcode(day: NaiveDate, bytes: &[u8]) -> Result<String, RatesError> {
    let encoding = match Encoding::for_bom(bytes) {
        Some((encoding, _)) => encoding,
        None => declared_encoding(day, bytes)?,
    };

    let (text, had_errors) = encoding.decode_with_bom_removal(bytes);
    if had_errors {
        return Err(RatesError::decode(
            day,
            format!("invalid {} byte sequence", encoding.name()),
        ));
    }
    Ok(text.into_owned())
}

/// Encoding named by the XML declaration, UTF-8 when there is none.
fn declared_encoding(day: NaiveDate, bytes: &[u8]) -> Result<&'static Encoding, RatesError> {
    let mut reader = Reader::from_reader(bytes);
    let mut buf = Vec::new();

    match reader.read_event_into(&mut buf) {
        Ok(Event::Decl(decl)) => match decl.encoding() {
            Some(Ok(label)) => Encoding::for_label(&label).ok_or_else(|| {
                RatesError::decode(
                    day,
                    format!(
                        "unsupported encoding '{}'",
                        String::from_utf8_lossy(&label)
                    ),
                )
            }),
            Some(Err(e)) => Err(RatesError::decode(
                day,
                format!("invalid XML declaration: {e}"),
            )),
            None => Ok(UTF_8),
        },
        Ok(_) => Ok(UTF_8),
        Err(e) => Err(RatesError::decode(day, format!("malformed publication: {e}"))),
    }
}
