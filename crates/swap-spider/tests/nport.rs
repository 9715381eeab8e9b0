use chrono::NaiveDate;
use swap_spider::sec::nport::{self, SwapPosition};
use swap_spider::SpiderError;

fn read(path: &str) -> String {
    std::fs::read_to_string(path).unwrap()
}

#[test]
fn parse_goox_filing() {
    let document = read("./tests/files/goox_nport.xml");

    let time = std::time::Instant::now();
    let filing = nport::parse(&document).unwrap();
    println!("PARSE: {:?}s", time.elapsed().as_secs_f64());

    assert_eq!(filing.series_id.as_deref(), Some("S000083421"));
    assert_eq!(filing.period_of_report, NaiveDate::from_ymd_opt(2024, 10, 31));
    assert_eq!(filing.designated_index, None);
    assert_eq!(filing.skipped, 0);

    // the money market holding is not a swap
    assert_eq!(
        filing.swaps,
        vec![
            SwapPosition {
                reference_name: Some("Alphabet Inc Class A".into()),
                counterparty_name: "Clear Street LLC".into(),
                notional_amt: 8_250_000.0,
                fixed_or_floating: Some("Floating".into()),
                floating_rt_index: Some("OBFR".into()),
                floating_rt_spread: Some(1.25),
            },
            SwapPosition {
                reference_name: Some("Alphabet Inc Class A".into()),
                counterparty_name: "Cantor Fitzgerald & Co.".into(),
                notional_amt: 11_400_250.5,
                fixed_or_floating: Some("Floating".into()),
                floating_rt_index: Some("SOFR".into()),
                floating_rt_spread: Some(0.95),
            },
            SwapPosition {
                reference_name: Some("Alphabet Inc Class A Reference Basket".into()),
                counterparty_name: "Marex Capital Markets Inc".into(),
                notional_amt: 4_100_000.0,
                fixed_or_floating: Some("Floating".into()),
                floating_rt_index: Some("FEDL01".into()),
                floating_rt_spread: None,
            },
        ]
    );
}

#[test]
fn malformed_swap_is_skipped() {
    let document = read("./tests/files/malformed_swap_nport.xml");
    let filing = nport::parse(&document).unwrap();

    assert_eq!(filing.skipped, 1);
    assert_eq!(filing.swaps.len(), 2);
    let counterparties: Vec<&str> = filing
        .swaps
        .iter()
        .map(|swap| swap.counterparty_name.as_str())
        .collect();
    assert_eq!(counterparties, ["Goldman Sachs International", "BNP Paribas"]);

    // prefixed elements and the trailing varInfo block
    assert_eq!(filing.series_id.as_deref(), Some("S000076344"));
    assert_eq!(
        filing.designated_index.as_deref(),
        Some("Tesla Inc Daily Leveraged Reference")
    );
    assert_eq!(filing.index_identifier.as_deref(), Some("TSLA2X"));
    // no reference instrument disclosed, and the holding title is not one
    assert!(filing.swaps.iter().all(|swap| swap.reference_name.is_none()));
}

#[test]
fn cdata_fields_are_read() {
    let document = r#"<edgarSubmission>
        <formData><invstOrSecs>
          <invstOrSec>
            <title>TESLA INC SWAP - BNP</title>
            <derivativeInfo>
              <swapDeriv>
                <counterparties><counterpartyName><![CDATA[BNP Paribas]]></counterpartyName></counterparties>
                <descRefInstrmnt><otherRefInst><issueTitle><![CDATA[Tesla Inc & Co]]></issueTitle></otherRefInst></descRefInstrmnt>
                <notionalAmt><![CDATA[ 96,000,000 ]]></notionalAmt>
              </swapDeriv>
            </derivativeInfo>
          </invstOrSec>
        </invstOrSecs></formData>
      </edgarSubmission>"#;
    let filing = nport::parse(document).unwrap();

    assert_eq!(filing.skipped, 0);
    assert_eq!(filing.swaps.len(), 1);
    assert_eq!(filing.swaps[0].counterparty_name, "BNP Paribas");
    assert_eq!(filing.swaps[0].reference_name.as_deref(), Some("Tesla Inc & Co"));
    assert_eq!(filing.swaps[0].notional_amt, 96_000_000.0);
}

#[test]
fn n_swaps_in_n_records_out() {
    for n in [0usize, 1, 7, 40] {
        let document = synthetic(n, &[]);
        let filing = nport::parse(&document).unwrap();
        assert_eq!(filing.swaps.len(), n);
        assert_eq!(filing.skipped, 0);
        for (i, swap) in filing.swaps.iter().enumerate() {
            assert_eq!(swap.counterparty_name, format!("Counterparty {i}"));
            assert_eq!(swap.notional_amt, (i as f64 + 1.0) * 1000.0);
            assert_eq!(swap.floating_rt_spread, Some(i as f64 / 100.0));
        }
    }
}

#[test]
fn one_malformed_among_n() {
    let n = 5;
    let document = synthetic(n, &[2]);
    let filing = nport::parse(&document).unwrap();
    assert_eq!(filing.swaps.len(), n);
    assert_eq!(filing.skipped, 1);
}

#[test]
fn swap_without_counterparty_is_skipped() {
    let document = r#"<edgarSubmission>
        <formData><invstOrSecs>
          <invstOrSec>
            <title>ORPHAN SWAP</title>
            <derivativeInfo><swapDeriv><notionalAmt>100</notionalAmt></swapDeriv></derivativeInfo>
          </invstOrSec>
        </invstOrSecs></formData>
      </edgarSubmission>"#;
    let filing = nport::parse(document).unwrap();
    assert!(filing.swaps.is_empty());
    assert_eq!(filing.skipped, 1);
}

#[test]
fn broken_xml_is_a_parse_error() {
    let document = "<edgarSubmission><formData></genInfo></edgarSubmission>";
    assert!(matches!(nport::parse(document), Err(SpiderError::Parse(_))));
    assert!(matches!(nport::parse(""), Err(SpiderError::Parse(_))));
}

// Builds a filing with `n` good swaps, plus a malformed one after each index in `broken_after`.
fn synthetic(n: usize, broken_after: &[usize]) -> String {
    let mut holdings = String::new();
    for i in 0..n {
        holdings.push_str(&format!(
            r#"<invstOrSec>
                 <title>SWAP {i}</title>
                 <derivativeInfo>
                   <swapDeriv derivCat="SWP">
                     <counterparties><counterpartyName>Counterparty {i}</counterpartyName></counterparties>
                     <floatingPmntDesc fixedOrFloating="Floating" floatingRtIndex="SOFR" floatingRtSpread="{spread}"/>
                     <notionalAmt>{notional}</notionalAmt>
                   </swapDeriv>
                 </derivativeInfo>
               </invstOrSec>"#,
            spread = i as f64 / 100.0,
            notional = (i as f64 + 1.0) * 1000.0,
        ));
        if broken_after.contains(&i) {
            holdings.push_str(
                r#"<invstOrSec>
                     <title>BROKEN</title>
                     <derivativeInfo>
                       <swapDeriv>
                         <counterparties><counterpartyName>Broken</counterpartyName></counterparties>
                       </swapDeriv>
                     </derivativeInfo>
                   </invstOrSec>"#,
            );
        }
    }
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
           <edgarSubmission xmlns="http://www.sec.gov/edgar/nport">
             <formData>
               <genInfo><seriesId>S000000042</seriesId><repPdEndDt>2024-06-30</repPdEndDt></genInfo>
               <invstOrSecs>{holdings}</invstOrSecs>
             </formData>
           </edgarSubmission>"#
    )
}
