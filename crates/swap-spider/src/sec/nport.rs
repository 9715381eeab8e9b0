use crate::error::{Result, SpiderError};
use chrono::NaiveDate;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use tracing::{debug, trace, warn};

// N-PORT primary documents look like this (namespaces omitted; they're matched by local
// name, since filers are inconsistent about prefixes):
//
// <edgarSubmission>
//   <formData>
//     <genInfo>
//       <seriesId>S000076344</seriesId>
//       <repPdEndDt>2024-07-31</repPdEndDt>
//     </genInfo>
//     <invstOrSecs>
//       <invstOrSec>
//         <name>TESLA INC</name>
//         <title>TESLA INC SWAP</title>
//         ...
//         <assetCat>DE</assetCat>
//         <derivativeInfo>
//           <swapDeriv derivCat="SWP">
//             <counterparties>
//               <counterpartyName>Goldman Sachs International</counterpartyName>
//             </counterparties>
//             <descRefInstrmnt>
//               <otherRefInst>
//                 <issuerName>Tesla Inc</issuerName>
//                 <issueTitle>Tesla Inc</issueTitle>
//               </otherRefInst>
//             </descRefInstrmnt>
//             <floatingPmntDesc fixedOrFloating="Floating" floatingRtIndex="OBFR"
//                               floatingRtSpread="0.45" pmntAmt="..." curCd="USD"/>
//             <notionalAmt>184212345.12</notionalAmt>
//             ...
//           </swapDeriv>
//         </derivativeInfo>
//       </invstOrSec>
//       ...
//     </invstOrSecs>
//     <signature>...</signature>
//   </formData>
//   ... optionally, for index funds:
//   <varInfo>
//     <nameDesignatedIndex>Solactive US Large Cap Index</nameDesignatedIndex>
//     <indexIdentifier>SOLUSLC</indexIdentifier>
//   </varInfo>
// </edgarSubmission>

const ROOT: &str = "edgarSubmission";

/// Filing level facts plus every well-formed swap position.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ParsedFiling {
    pub series_id: Option<String>,
    pub period_of_report: Option<NaiveDate>,
    pub designated_index: Option<String>,
    pub index_identifier: Option<String>,
    pub swaps: Vec<SwapPosition>,
    /// Swap positions dropped for missing or malformed fields.
    pub skipped: usize,
}

/// A single swap holding, as disclosed.
#[derive(Clone, Debug, PartialEq)]
pub struct SwapPosition {
    /// Name of the reference instrument (index, basket or security) the swap tracks, when the
    /// holding discloses one. The holding's own title is not a reference name.
    pub reference_name: Option<String>,
    pub counterparty_name: String,
    pub notional_amt: f64,
    pub fixed_or_floating: Option<String>,
    pub floating_rt_index: Option<String>,
    pub floating_rt_spread: Option<f64>,
}

/// Parse an N-PORT primary document.
///
/// Swap positions that lack a counterparty, or whose notional amount is missing or not a
/// number, are skipped and counted in [`ParsedFiling::skipped`]. A document that isn't
/// well-formed XML, or isn't an N-PORT submission at all, is an error.
pub fn parse(document: &str) -> Result<ParsedFiling> {
    let time = std::time::Instant::now();

    let mut reader = Reader::from_str(document);
    reader.config_mut().trim_text(true);

    let mut filing = ParsedFiling::default();
    let mut path: Vec<String> = Vec::new();
    let mut holding: Option<Holding> = None;
    let mut seen_root = false;

    loop {
        match reader.read_event()? {
            Event::Start(e) => {
                let name = local_name(&e);
                if !seen_root {
                    check_root(&name)?;
                    seen_root = true;
                }
                open_element(&name, &e, &path, &mut holding)?;
                path.push(name);
            }
            Event::Empty(e) => {
                let name = local_name(&e);
                if !seen_root {
                    check_root(&name)?;
                    seen_root = true;
                }
                // an empty <invstOrSec/> holds nothing worth opening
                if name != "invstOrSec" {
                    open_element(&name, &e, &path, &mut holding)?;
                }
            }
            Event::Text(e) => {
                let text = e.unescape()?;
                let text = text.trim();
                if !text.is_empty() {
                    on_text(text, &path, &mut filing, holding.as_mut());
                }
            }
            Event::CData(e) => {
                let text = e.decode().map_err(quick_xml::Error::from)?;
                let text = text.trim();
                if !text.is_empty() {
                    on_text(text, &path, &mut filing, holding.as_mut());
                }
            }
            Event::End(_) => {
                if let Some(name) = path.pop() {
                    if name == "invstOrSec" {
                        if let Some(holding) = holding.take() {
                            close_holding(holding, &mut filing);
                        }
                    }
                }
            }
            Event::Eof => break,
            _ => (),
        }
    }

    if !seen_root {
        return Err(SpiderError::Parse("document is empty".into()));
    }
    if !path.is_empty() {
        return Err(SpiderError::Parse(format!(
            "document ended inside <{}>",
            path.join("/")
        )));
    }

    debug!(
        "N-PORT parsed: {} swaps, {} skipped. {}",
        filing.swaps.len(),
        filing.skipped,
        crate::time_elapsed(time)
    );
    Ok(filing)
}

fn check_root(name: &str) -> Result<()> {
    if name == ROOT {
        Ok(())
    } else {
        Err(SpiderError::Parse(format!(
            "expected <{ROOT}> root element, found <{name}>"
        )))
    }
}

fn local_name(e: &BytesStart) -> String {
    String::from_utf8_lossy(e.local_name().as_ref()).into_owned()
}

fn within(path: &[String], name: &str) -> bool {
    path.iter().any(|p| p == name)
}

// Holding being assembled between <invstOrSec> and </invstOrSec>.
#[derive(Default)]
struct Holding {
    is_swap: bool,
    title: Option<String>,
    counterparty_name: Option<String>,
    notional: Option<String>,
    index_name: Option<String>,
    issue_title: Option<String>,
    issuer_name: Option<String>,
    pmnt_leg: Option<Leg>,
    rec_leg: Option<Leg>,
}

#[derive(Default)]
struct Leg {
    fixed_or_floating: Option<String>,
    floating_rt_index: Option<String>,
    floating_rt_spread: Option<String>,
}

fn open_element(
    name: &str,
    e: &BytesStart,
    path: &[String],
    holding: &mut Option<Holding>,
) -> Result<()> {
    if name == "invstOrSec" {
        *holding = Some(Holding::default());
        return Ok(());
    }

    let Some(holding) = holding.as_mut() else {
        return Ok(());
    };
    match name {
        "swapDeriv" => holding.is_swap = true,
        "floatingPmntDesc" if within(path, "swapDeriv") && holding.pmnt_leg.is_none() => {
            holding.pmnt_leg = Some(read_leg(e)?)
        }
        "floatingRecDesc" if within(path, "swapDeriv") && holding.rec_leg.is_none() => {
            holding.rec_leg = Some(read_leg(e)?)
        }
        _ => (),
    }
    Ok(())
}

fn read_leg(e: &BytesStart) -> Result<Leg> {
    let mut leg = Leg::default();
    for attr in e.attributes() {
        let attr = attr.map_err(quick_xml::Error::from)?;
        let value = attr.unescape_value()?.trim().to_string();
        if value.is_empty() {
            continue;
        }
        match attr.key.local_name().as_ref() {
            b"fixedOrFloating" => leg.fixed_or_floating = Some(value),
            b"floatingRtIndex" => leg.floating_rt_index = Some(value),
            b"floatingRtSpread" => leg.floating_rt_spread = Some(value),
            _ => (),
        }
    }
    Ok(leg)
}

fn on_text(text: &str, path: &[String], filing: &mut ParsedFiling, holding: Option<&mut Holding>) {
    let Some(current) = path.last().map(String::as_str) else {
        return;
    };

    if let Some(holding) = holding {
        let parent = path.len().checked_sub(2).map(|i| path[i].as_str());
        let set = |slot: &mut Option<String>| {
            if slot.is_none() {
                *slot = Some(text.to_string());
            }
        };
        match current {
            "title" if parent == Some("invstOrSec") => set(&mut holding.title),
            "counterpartyName" if within(path, "swapDeriv") => set(&mut holding.counterparty_name),
            "notionalAmt" if within(path, "swapDeriv") => set(&mut holding.notional),
            "indexName" if within(path, "descRefInstrmnt") => set(&mut holding.index_name),
            "issueTitle" if within(path, "descRefInstrmnt") => set(&mut holding.issue_title),
            "issuerName" if within(path, "descRefInstrmnt") => set(&mut holding.issuer_name),
            _ => (),
        }
        return;
    }

    match current {
        "seriesId" if filing.series_id.is_none() => filing.series_id = Some(text.to_string()),
        "repPdEndDt" if filing.period_of_report.is_none() => {
            match NaiveDate::parse_from_str(text, "%Y-%m-%d") {
                Ok(date) => filing.period_of_report = Some(date),
                Err(err) => warn!("ignoring report period \"{text}\", error({err})"),
            }
        }
        "nameDesignatedIndex" if within(path, "varInfo") => {
            filing.designated_index.get_or_insert_with(|| text.to_string());
        }
        "indexIdentifier" if within(path, "varInfo") => {
            filing.index_identifier.get_or_insert_with(|| text.to_string());
        }
        _ => (),
    }
}

fn close_holding(holding: Holding, filing: &mut ParsedFiling) {
    if !holding.is_swap {
        return;
    }
    let label = holding
        .title
        .clone()
        .unwrap_or_else(|| "<untitled>".to_string());

    let Some(counterparty_name) = holding.counterparty_name else {
        warn!("skipping swap [{label}]: no counterparty");
        filing.skipped += 1;
        return;
    };
    let notional_amt = match holding.notional.as_deref().map(parse_amount) {
        Some(Some(amount)) => amount,
        Some(None) => {
            warn!(
                "skipping swap [{label}]: notional amount \"{}\" is not a number",
                holding.notional.as_deref().unwrap_or_default()
            );
            filing.skipped += 1;
            return;
        }
        None => {
            warn!("skipping swap [{label}]: no notional amount");
            filing.skipped += 1;
            return;
        }
    };

    // the paying leg is what the fund owes; fall back to the receiving leg
    let leg = holding.pmnt_leg.or(holding.rec_leg).unwrap_or_default();
    let floating_rt_spread = leg.floating_rt_spread.as_deref().and_then(|raw| {
        let spread = parse_amount(raw);
        if spread.is_none() {
            trace!("ignoring floating rate spread \"{raw}\" for [{label}]");
        }
        spread
    });

    filing.swaps.push(SwapPosition {
        reference_name: holding
            .index_name
            .or(holding.issue_title)
            .or(holding.issuer_name),
        counterparty_name,
        notional_amt,
        fixed_or_floating: leg.fixed_or_floating,
        floating_rt_index: leg.floating_rt_index,
        floating_rt_spread,
    });
}

/// Parse a number as filers write it: `1,234.50`, `$1234.5`, ` -0.25 `.
pub(crate) fn parse_amount(raw: &str) -> Option<f64> {
    let cleaned: String = raw
        .trim()
        .chars()
        .filter(|c| !matches!(c, ',' | '$' | '%'))
        .collect();
    cleaned.parse::<f64>().ok().filter(|v| v.is_finite())
}
