use anyhow::Result;
use mapcond::catalog::Catalog;
use mapcond::extract::extract;
use mapcond::harness::run_harness;
use mapcond::model::{ZoneCondition, ZoneStatus};
use mapcond::section::{PageInput, SectionStrategy, split_sections};
use scraper::Html;
use std::fs;
use std::path::Path;

fn fixture_html() -> Result<String> {
    let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/data/conditions.html");
    Ok(fs::read_to_string(path)?)
}

fn zone<'a>(zones: &'a [ZoneCondition], name: &str) -> &'a ZoneCondition {
    zones
        .iter()
        .find(|z| z.name == name)
        .unwrap_or_else(|| panic!("zone {name} missing from output"))
}

#[test]
fn document_input_uses_dom_walk_sections() -> Result<()> {
    let html = fixture_html()?;
    let doc = Html::parse_document(&html);
    let input = PageInput::Document(&doc);

    assert_eq!(input.strategy(), SectionStrategy::DomWalk);

    let sections = split_sections(&input, &Catalog::default());
    assert_eq!(
        sections[0],
        "Dam Battlegrounds CURRENT CLOUDY WEATHER Next Condition ACID RAIN 3:45 PM"
    );
    assert_eq!(sections[5], "Stella Montis Map not available");
    Ok(())
}

#[test]
fn document_fixture_produces_expected_records() -> Result<()> {
    let html = fixture_html()?;
    let doc = Html::parse_document(&html);
    let result = extract(&PageInput::Document(&doc), &Catalog::default());

    assert_eq!(result.zones.len(), 6);
    assert_eq!(result.time_info.current_time.as_deref(), Some("3:12:45 PM"));
    assert_eq!(result.time_info.timezone.as_deref(), Some("America/New_York"));

    let dam = zone(&result.zones, "Dam Battlegrounds");
    assert_eq!(dam.current_condition.as_deref(), Some("CLOUDY WEATHER"));
    assert_eq!(dam.next_condition.as_deref(), Some("ACID RAIN"));
    assert_eq!(dam.next_time.as_deref(), Some("3:45 PM"));

    let buried = zone(&result.zones, "Buried City");
    assert_eq!(buried.current_condition.as_deref(), Some("ELECTROMAGNETIC STORM"));
    assert!(buried.is_major);
    assert_eq!(buried.next_time.as_deref(), Some("10:00 AM"));

    let spaceport = zone(&result.zones, "The Spaceport");
    assert!(spaceport.is_major);
    assert_eq!(spaceport.current_condition, None);
    assert_eq!(spaceport.next_condition.as_deref(), Some("HARVESTER"));

    let gate = zone(&result.zones, "The Blue Gate");
    assert_eq!(gate.current_condition.as_deref(), Some("LUSH BLOOMS"));

    assert_eq!(
        zone(&result.zones, "Practice Range").status,
        ZoneStatus::NoActiveCondition
    );
    assert_eq!(
        zone(&result.zones, "Stella Montis").status,
        ZoneStatus::NotAvailable
    );
    Ok(())
}

#[test]
fn zone_without_heading_is_empty_in_dom_walk() {
    let doc = Html::parse_document(
        "<html><body><div><h2>Buried City</h2><p>CURRENT HURRICANE</p></div></body></html>",
    );
    let result = extract(&PageInput::Document(&doc), &Catalog::default());

    assert_eq!(
        zone(&result.zones, "Buried City").current_condition.as_deref(),
        Some("HURRICANE")
    );
    assert_eq!(
        zone(&result.zones, "Dam Battlegrounds"),
        &ZoneCondition::empty("Dam Battlegrounds")
    );
}

#[test]
fn dom_walk_stops_before_sibling_zone_cards() {
    let doc = Html::parse_document(
        r#"<html><body><section>
            <div><h4>Dam Battlegrounds</h4></div>
            <div><h4>Buried City</h4><p>MAJOR CONDITION</p></div>
        </section></body></html>"#,
    );
    let result = extract(&PageInput::Document(&doc), &Catalog::default());

    assert!(!zone(&result.zones, "Dam Battlegrounds").is_major);
    assert!(zone(&result.zones, "Buried City").is_major);
}

#[test]
fn harness_reports_strategy_parity_on_fixture() -> Result<()> {
    let html = fixture_html()?;
    let report = run_harness(&html, &Catalog::default());

    assert_eq!(report.zones, 6);
    assert_eq!(report.agreeing, 6);
    assert!(report.regex_idempotent);
    assert!(report.dom_walk_idempotent);
    assert!(report.time_info_agrees);
    assert!(report.is_clean());
    Ok(())
}

#[test]
fn decorated_heading_is_found() {
    let html = r#"<html><body>
        <div class="card"><h3><span>🗺️</span> Buried City</h3><p>CURRENT HURRICANE</p></div>
        <div class="card"><div class="card-title">Dam Battlegrounds <span class="badge">LIVE</span></div>
            <p>MAJOR CONDITION</p></div>
    </body></html>"#;
    let doc = Html::parse_document(html);
    let result = extract(&PageInput::Document(&doc), &Catalog::default());

    assert_eq!(
        zone(&result.zones, "Buried City").current_condition.as_deref(),
        Some("HURRICANE")
    );
    assert!(zone(&result.zones, "Dam Battlegrounds").is_major);
    assert!(run_harness(html, &Catalog::default()).is_clean());
}

#[test]
fn heading_with_condition_text_wins_over_nav_link() {
    let doc = Html::parse_document(
        r#"<html><body>
            <nav><a href="/buried">Buried City</a><a href="/dam">Dam Battlegrounds</a></nav>
            <div class="card"><h3>Buried City <small>LIVE</small></h3>
                <p>CURRENT HURRICANE MAJOR CONDITION</p></div>
        </body></html>"#,
    );
    let result = extract(&PageInput::Document(&doc), &Catalog::default());

    let buried = zone(&result.zones, "Buried City");
    assert_eq!(buried.current_condition.as_deref(), Some("HURRICANE"));
    assert!(buried.is_major);
    assert_eq!(
        zone(&result.zones, "Dam Battlegrounds"),
        &ZoneCondition::empty("Dam Battlegrounds")
    );
}

#[test]
fn long_prose_mentioning_a_zone_is_not_a_heading() {
    let doc = Html::parse_document(
        r#"<html><body><p>Squads dropping into Buried City this week should expect the
            CURRENT HURRICANE to linger well past the usual rotation window for the server.</p>
        </body></html>"#,
    );
    let result = extract(&PageInput::Document(&doc), &Catalog::default());

    assert_eq!(
        zone(&result.zones, "Buried City"),
        &ZoneCondition::empty("Buried City")
    );
}
