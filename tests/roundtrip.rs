//! Integration test: codec fidelity on realistic WordprocessingML

use linch_docx_template::document::ParagraphFacet;
use linch_docx_template::template::render_items;
use linch_docx_template::{decode_document, encode_document, Item, ItemKind, RenderOptions};
use pretty_assertions::assert_eq;
use serde_json::json;

const DOCUMENT: &str = concat!(
    "<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>\r\n",
    r#"<w:document xmlns:mc="http://schemas.openxmlformats.org/markup-compatibility/2006" "#,
    r#"xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships" "#,
    r#"xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main" "#,
    r#"xmlns:wp="http://schemas.openxmlformats.org/drawingml/2006/wordprocessingDrawing" "#,
    r#"xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" "#,
    r#"xmlns:w14="http://schemas.microsoft.com/office/word/2010/wordml" mc:Ignorable="w14">"#,
    r#"<w:background w:color="FFFFFF"/>"#,
    "<w:body>\n",
    r#"  <w:p w14:paraId="1A2B3C4D" w14:textId="77777777" w:rsidR="00A1"><w:pPr><w:pStyle w:val="Title"/><w:spacing w:before="0" w:after="240" w:line="276" w:lineRule="auto"/><w:jc w:val="center"/><w:rPr><w:b/><w:sz w:val="32"/></w:rPr></w:pPr><w:bookmarkStart w:id="0" w:name="_GoBack"/><w:r w:rsidRPr="00B2"><w:rPr><w:rStyle w:val="Strong"/><w:color w:val="2F5496" w:themeColor="accent1"/></w:rPr><w:t>Report for {{FileName}}</w:t></w:r><w:bookmarkEnd w:id="0"/></w:p>"#,
    "\n",
    r#"  <w:p><w:r><w:t xml:space="preserve">Tom &amp; Jerry &lt;3 </w:t></w:r><w:proofErr w:type="spellStart"/><w:r><w:t>teh</w:t></w:r><w:proofErr w:type="spellEnd"/><w:hyperlink r:id="rId5" w:history="1"><w:r><w:rPr><w:rStyle w:val="Hyperlink"/></w:rPr><w:t>link</w:t></w:r></w:hyperlink></w:p>"#,
    "\n",
    "  <!-- layout table -->\n",
    r#"  <w:tbl><w:tblPr><w:tblStyle w:val="TableGrid"/><w:tblW w:w="0" w:type="auto"/></w:tblPr><w:tblGrid><w:gridCol w:w="4675"/><w:gridCol w:w="4675"/></w:tblGrid><w:tr w:rsidR="00C3"><w:trPr><w:cantSplit/></w:trPr><w:tc><w:tcPr><w:tcW w:w="4675" w:type="dxa"/></w:tcPr><w:p><w:r><w:t>{{Data.S1}}</w:t></w:r></w:p></w:tc><w:tc><w:tcPr><w:gridSpan w:val="1"/></w:tcPr><w:p/></w:tc></w:tr></w:tbl>"#,
    "\n",
    r#"  <w:p><w:r><w:drawing><wp:inline distT="0" distB="0"><wp:extent cx="952500" cy="476250"/><wp:docPr id="1" name="Picture 1" descr="logo &quot;small&quot;"/><a:graphic><a:graphicData uri="http://schemas.openxmlformats.org/drawingml/2006/picture"/></a:graphic></wp:inline></w:drawing></w:r></w:p>"#,
    "\n",
    r#"  <mc:AlternateContent><mc:Choice Requires="w14"><w:p><w:r><w:t>new</w:t></w:r></w:p></mc:Choice><mc:Fallback><w:p><w:r><w:t>old</w:t></w:r></w:p></mc:Fallback></mc:AlternateContent>"#,
    "\n",
    r#"  <w:sectPr w:rsidR="00A1"><w:pgSz w:w="12240" w:h="15840"/><w:pgMar w:top="1440" w:right="1440" w:bottom="1440" w:left="1440" w:header="720" w:footer="720" w:gutter="0"/></w:sectPr>"#,
    "\n</w:body>",
    "</w:document>\r\n"
);

fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

#[test]
fn test_realistic_document_roundtrips_byte_for_byte() {
    init_logger();

    let part = decode_document(DOCUMENT.as_bytes()).unwrap();
    let encoded = encode_document(&part).unwrap();
    assert_eq!(String::from_utf8(encoded).unwrap(), DOCUMENT);
}

#[test]
fn test_structure_of_decoded_items() {
    let part = decode_document(DOCUMENT.as_bytes()).unwrap();

    let kinds: Vec<_> = part
        .items
        .iter()
        .filter(|item| !item.is_whitespace())
        .map(|item| (item.kind(), item.tag().to_string()))
        .collect();
    assert_eq!(
        kinds,
        [
            (ItemKind::Paragraph, "p".to_string()),
            (ItemKind::Paragraph, "p".to_string()),
            (ItemKind::Raw, String::new()),
            (ItemKind::Table, "tbl".to_string()),
            (ItemKind::Paragraph, "p".to_string()),
            (ItemKind::Raw, "AlternateContent".to_string()),
            (ItemKind::Raw, "sectPr".to_string()),
        ]
    );
    assert_eq!(part.before.len(), 1);
    assert_eq!(part.before[0].tag(), "background");

    let title = part.items[1].as_paragraph().unwrap();
    let params = title.params.as_ref().unwrap();
    assert_eq!(title.style().as_deref(), Some("Title"));
    assert_eq!(params.justification().and_then(|jc| jc.value()).as_deref(), Some("center"));
    assert!(params.mark_run_params().unwrap().bold());
    assert_eq!(title.runs()[0].params.as_ref().unwrap().color().as_deref(), Some("2F5496"));

    let text = part.items[3].plain_text();
    assert_eq!(text, "Tom & Jerry <3 tehlink");
}

#[test]
fn test_drawing_facets() {
    let part = decode_document(DOCUMENT.as_bytes()).unwrap();
    let drawing_paragraph = part
        .items
        .iter()
        .filter(|item| item.kind() == ItemKind::Paragraph)
        .nth(2)
        .unwrap();
    let Item::Run(run) = &drawing_paragraph.children()[0] else {
        panic!("expected run");
    };
    let Item::Drawing(drawing) = &run.children[0] else {
        panic!("expected drawing");
    };
    assert_eq!(drawing.extent(), Some((952500, 476250)));
    assert_eq!(drawing.description().as_deref(), Some("logo \"small\""));
}

#[test]
fn test_clone_is_independent() {
    let part = decode_document(DOCUMENT.as_bytes()).unwrap();
    let original = part.items[1].clone();
    let mut copy = original.clone();

    let paragraph = copy.paragraphs_mut().pop().unwrap();
    paragraph.replace_text_ranges(&[(0..6, "Summary".to_string())]);
    paragraph.params_mut().set_justification("left");

    assert_eq!(copy.plain_text(), "Summary for {{FileName}}");
    assert_eq!(original.plain_text(), "Report for {{FileName}}");
    assert_eq!(original, part.items[1]);
}

#[test]
fn test_rendering_changes_only_substituted_text() {
    init_logger();

    let mut part = decode_document(DOCUMENT.as_bytes()).unwrap();
    let report = render_items(
        &mut part.items,
        &json!({"FileName": "Q3 & Q4", "Data": {"S1": 42}}),
        &RenderOptions::default(),
    )
    .unwrap();
    assert!(report.is_clean());

    let expected = DOCUMENT
        .replace("{{FileName}}", "Q3 &amp; Q4")
        .replace("{{Data.S1}}", "42");
    assert_eq!(String::from_utf8(encode_document(&part).unwrap()).unwrap(), expected);
}

#[test]
fn test_new_facet_is_inserted_in_schema_order() {
    let xml = r#"<w:document xmlns:w="urn:w"><w:body><w:p><w:pPr><w:pStyle w:val="Body"/><w:jc w:val="both"/></w:pPr></w:p></w:body></w:document>"#;
    let mut part = decode_document(xml.as_bytes()).unwrap();

    let Item::Paragraph(p) = &mut part.items[0] else {
        panic!("expected paragraph");
    };
    p.params_mut().set_bidi(true);
    let names: Vec<_> = p
        .params
        .as_ref()
        .unwrap()
        .facets()
        .iter()
        .filter_map(ParagraphFacet::local_name)
        .collect();
    assert_eq!(names, ["pStyle", "bidi", "jc"]);
}

const HAND_EDITED: &str = concat!(
    "<?xml version='1.0' encoding='UTF-8'?>\n",
    "<w:document xmlns:w=\"http://schemas.openxmlformats.org/wordprocessingml/2006/main\"\n",
    "    xmlns:r='http://schemas.openxmlformats.org/officeDocument/2006/relationships'>",
    "<w:body >",
    "<w:p\n    w:rsidR=\"00A1\"  w:rsidRDefault='00A1' >",
    "<w:r><w:t xml:space='preserve'>{{Name}} </w:t></w:r>",
    "<w:r><w:t>a<!--note-->b<![CDATA[<c>]]></w:t></w:r>",
    "</w:p>",
    "<w:p w:x='say \"hi\"'/>",
    "</w:body></w:document>"
);

#[test]
fn test_hand_edited_markup_roundtrips_byte_for_byte() {
    let part = decode_document(HAND_EDITED.as_bytes()).unwrap();
    assert_eq!(part.items[0].plain_text(), "{{Name}} ab<c>");
    assert_eq!(String::from_utf8(encode_document(&part).unwrap()).unwrap(), HAND_EDITED);
}

#[test]
fn test_hand_edited_markup_changes_only_where_edited() {
    let mut part = decode_document(HAND_EDITED.as_bytes()).unwrap();
    render_items(&mut part.items, &json!({"Name": "x"}), &RenderOptions::default()).unwrap();
    let Item::Paragraph(quoted) = &mut part.items[1] else {
        panic!("expected paragraph");
    };
    quoted.tag.set_attr("w:y", "1");

    let expected = HAND_EDITED
        .replace("{{Name}}", "x")
        .replace("<w:p w:x='say \"hi\"'/>", "<w:p w:x='say \"hi\"' w:y=\"1\"/>");
    assert_eq!(String::from_utf8(encode_document(&part).unwrap()).unwrap(), expected);
}
