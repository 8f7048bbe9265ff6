//! # ZPL Golden Tests
//!
//! Whole-label outputs checked line by line. Positions are millimeters at
//! 203 dpi (1 mm = 7.992 dots, rounded half up).

use etiket::layout::{AnchorKey, FieldKey, FieldRule, FreeItem, FreeItemKind, PointMm};
use etiket::registry;
use etiket::{Assets, EditMode, LabelDocument, ValidationIssue, zpl};
use pretty_assertions::assert_eq;

// ============================================================================
// HELPERS
// ============================================================================

fn product_label() -> LabelDocument {
    let mut doc = LabelDocument::default();
    doc.field_values.logo = "ACME".into();
    doc.field_values.product_name = "Vida".into();
    doc.field_values.amount = "3".into();
    doc.field_values.entry_date = "2024-03-05".into();
    doc.field_values.barcode = "400638133393".into();
    doc
}

fn lines(zpl: &str) -> Vec<&str> {
    zpl.split('\n').collect()
}

// ============================================================================
// STANDARD MODE
// ============================================================================

#[test]
fn test_golden_standard_label() {
    let out = zpl::generate(&product_label(), &Assets::new());
    assert_eq!(
        lines(&out.zpl),
        vec![
            "^XA",
            "^CI28",
            "^PW799",
            "^LL559",
            "^LH0,0",
            "^MD15",
            "^FO32,24^A0N,32,32^FDACME^FS",
            "^FO32,96^A0N,28,28^FDVida^FS",
            "^FO32,192^A0N,20,20^FDMiktar: 3^FS",
            "^FO32,220^A0N,20,20^FDGiriş Tarihi: 05.03.2024^FS",
            "^FO32,416^BY3^BEN,96,Y,N^FD4006381333931^FS",
            "^XZ",
        ]
    );
    assert!(out.issues.is_empty());
}

#[test]
fn test_golden_from_json_document() {
    let json = r#"{
        "labelWidthMm": 50,
        "labelHeightMm": 30,
        "dpi": 300,
        "zplDarkness": 20,
        "copies": 2,
        "anchors": {
            "title": {"x": 0, "y": 0},
            "productName": {"x": 2, "y": 2},
            "details": {"x": 2, "y": 10},
            "barcode": {"x": 2, "y": 15}
        },
        "fieldValues": {"productName": "Somun"}
    }"#;
    let doc: LabelDocument = serde_json::from_str(json).unwrap();
    let out = zpl::generate(&doc, &Assets::new());
    // 300 dpi: 50mm → 591, 30mm → 354, 2mm → 24, font 3.5mm → 41
    assert_eq!(
        lines(&out.zpl),
        vec![
            "^XA",
            "^CI28",
            "^PW591",
            "^LL354",
            "^LH0,0",
            "^MD20",
            "^FO24,24^A0N,41,41^FDSomun^FS",
            "^PQ2",
            "^XZ",
        ]
    );
}

#[test]
fn test_output_is_deterministic() {
    let mut doc = product_label();
    doc.add_free_item(FreeItem::text("unused in standard mode", 1.0, 1.0));
    let first = zpl::generate(&doc, &Assets::new());
    let second = zpl::generate(&doc.clone(), &Assets::new());
    assert_eq!(first, second);
    assert!(!first.zpl.ends_with('\n'));
}

#[test]
fn test_label_type_visibility() {
    let types = registry::built_in();
    let barkodsuz = types.iter().find(|t| t.name == "Barkodsuz").unwrap();

    let mut doc = product_label();
    doc.apply_label_type(barkodsuz);
    let out = zpl::generate(&doc, &Assets::new());
    assert!(!out.zpl.contains("^BY"));
    assert!(!out.zpl.contains("^BEN"));
    assert!(out.zpl.contains("^FDVida^FS"));
}

#[test]
fn test_hidden_details_keep_other_lines() {
    let mut doc = product_label();
    *doc.visible_fields.get_mut(FieldKey::Amount) = FieldRule::HIDDEN;
    let out = zpl::generate(&doc, &Assets::new());
    assert!(!out.zpl.contains("Miktar"));
    // the entry date moves up to the first details line
    assert!(
        out.zpl
            .contains("^FO32,192^A0N,20,20^FDGiriş Tarihi: 05.03.2024^FS")
    );
}

#[test]
fn test_anchor_survives_hide_and_show() {
    let mut doc = product_label();
    doc.set_anchor(AnchorKey::Barcode, PointMm::new(10.0, 40.0));

    *doc.visible_fields.get_mut(FieldKey::Barcode) = FieldRule::HIDDEN;
    assert!(!zpl::generate(&doc, &Assets::new()).zpl.contains("^BEN"));

    *doc.visible_fields.get_mut(FieldKey::Barcode) = FieldRule::default();
    let out = zpl::generate(&doc, &Assets::new());
    // 10mm → 80, 40mm → 320
    assert!(out.zpl.contains("^FO80,320^BY3^BEN"));
}

#[test]
fn test_preview_darkness_does_not_change_zpl() {
    let doc = product_label();
    let mut darker = doc.clone();
    darker.darkness_preview = 1.8;
    assert_eq!(
        zpl::generate(&doc, &Assets::new()).zpl,
        zpl::generate(&darker, &Assets::new()).zpl
    );
}

#[test]
fn test_unsupported_dpi_falls_back() {
    let mut doc = product_label();
    doc.dpi = 150;
    let out = zpl::generate(&doc, &Assets::new());
    assert!(out.zpl.contains("^PW799"));
    assert!(out.issues.contains(&ValidationIssue::UnsupportedDpi {
        requested: 150,
        applied: 203,
    }));
}

// ============================================================================
// FREE MODE
// ============================================================================

#[test]
fn test_golden_free_label() {
    let mut doc = LabelDocument {
        mode: EditMode::Free,
        ..Default::default()
    };
    doc.field_values.barcode = "4006381333931".into();

    let mut ring = FreeItem::new(FreeItemKind::Ring, 30.0, 10.0);
    ring.z_index = Some(5);
    doc.add_free_item(ring);
    let mut text = FreeItem::text("KIRILIR", 2.0, 2.0);
    text.z_index = Some(1);
    doc.add_free_item(text);

    let out = zpl::generate(&doc, &Assets::new());
    // text font defaults to 3mm → 24 dots; ring 12mm → 96, 1mm stroke → 8
    assert_eq!(
        lines(&out.zpl),
        vec![
            "^XA",
            "^CI28",
            "^PW799",
            "^LL559",
            "^LH0,0",
            "^MD15",
            "^FO16,16^A0N,24,24^FDKIRILIR^FS",
            "^FO240,80^GE96,96,8^FS",
            "^XZ",
        ]
    );
}

#[test]
fn test_free_image_missing_is_reported() {
    let mut doc = LabelDocument {
        mode: EditMode::Free,
        ..Default::default()
    };
    let mut image = FreeItem::new(FreeItemKind::Image, 0.0, 0.0);
    image.src = Some("https://example.invalid/logo.png".into());
    doc.add_free_item(image);

    let out = zpl::generate(&doc, &Assets::new());
    assert!(!out.zpl.contains("^GFA"));
    assert_eq!(
        out.issues,
        vec![ValidationIssue::MissingImage {
            reference: "https://example.invalid/logo.png".into()
        }]
    );
}
