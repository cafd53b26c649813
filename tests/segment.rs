//! Segmentation tests on realistic recognized text.
//!
//! Run with:
//!   cargo test --test segment

use hymnal_extract::{segment, BlockKind, ContentBlock, HymnRecord};

// ── Helpers ──────────────────────────────────────────────────────────────────

fn lines(src: &[&str]) -> Vec<String> {
    src.iter().map(|s| s.to_string()).collect()
}

fn only(hymns: &[HymnRecord], number: u32) -> &HymnRecord {
    hymns
        .iter()
        .find(|h| h.number == number)
        .unwrap_or_else(|| panic!("hymn {number} not found in {hymns:#?}"))
}

/// Three hymns in the three shapes a hymnal scan produces: blank-line
/// stanzas with a chorus, numeral-marked stanzas, and hymn 176.
const HYMNAL: &str = "\
HIMNARIO EVANGÉLICO
Índice general

1. OH QUE AMIGO NOS ES CRISTO
¡Oh qué amigo nos es Cristo!
Él llevó nuestro dolor

CORO
Gloria, gloria
aleluya

Vive siempre en oración
y tendrás su bendición

2. CASTILLO FUERTE ES NUESTRO DIOS
1
Castillo fuerte es nuestro Dios,
defensa y buen escudo.
2
Nuestro valor es nada aquí,
con él todo es perdido.
coro:
Su reino es
4
El Verbo sólo ha de triunfar
176. CUANDO ALLÁ SE PASE LISTA
Cuando la trompeta suene
en aquel día final
2. En la mañana clara y bella
cuando los salvos se levanten
3. Trabajemos por el Maestro
";

// ── Single-hymn shapes ──────────────────────────────────────────────────────

#[test]
fn blank_lines_separate_implicit_stanzas() {
    let text = "1. OH QUE AMIGO NOS ES CRISTO\nlinea uno\n\nlinea dos\n2. CASTILLO FUERTE\nx";
    let hymns = segment(text);

    let hymn = &hymns[0];
    assert_eq!(hymn.number, 1);
    assert_eq!(hymn.title, "oh que amigo nos es cristo");
    assert_eq!(
        hymn.content,
        vec![
            ContentBlock::stanza(1, lines(&["linea uno"])),
            ContentBlock::stanza(2, lines(&["linea dos"])),
        ]
    );
}

#[test]
fn numeral_lines_number_explicit_stanzas() {
    let text = "1. OH QUE AMIGO NOS ES CRISTO\n1\nprimera linea\n2\nsegunda linea";
    let hymns = segment(text);

    assert_eq!(
        hymns[0].content,
        vec![
            ContentBlock::stanza(1, lines(&["primera linea"])),
            ContentBlock::stanza(2, lines(&["segunda linea"])),
        ]
    );
}

#[test]
fn coro_line_opens_chorus() {
    let text = "1. OH QUE AMIGO NOS ES CRISTO\nCORO\ngloria gloria";
    let hymns = segment(text);

    assert_eq!(
        hymns[0].content,
        vec![ContentBlock::chorus(lines(&["gloria gloria"]))]
    );
}

#[test]
fn hymn_176_keeps_numbered_lines_as_stanzas() {
    let text = "176. CUANDO ALLA SE PASE LISTA\n2. segunda estrofa";
    let hymns = segment(text);

    assert_eq!(hymns.len(), 1);
    assert_eq!(hymns[0].number, 176);
    assert_eq!(
        hymns[0].content,
        vec![ContentBlock::stanza(2, lines(&["segunda estrofa"]))]
    );
}

// ── Full hymnal ──────────────────────────────────────────────────────────────

#[test]
fn hymnal_front_matter_is_dropped_and_hymns_are_ordered() {
    let hymns = segment(HYMNAL);
    let numbers: Vec<u32> = hymns.iter().map(|h| h.number).collect();
    assert_eq!(numbers, vec![1, 2, 176]);
    assert!(hymns
        .iter()
        .flat_map(|h| h.content.iter())
        .flat_map(|b| b.lines.iter())
        .all(|l| !l.contains("índice")));
}

#[test]
fn implicit_hymn_with_chorus() {
    let hymns = segment(HYMNAL);
    let hymn = only(&hymns, 1);

    assert_eq!(
        hymn.content,
        vec![
            ContentBlock::stanza(1, lines(&["¡oh qué amigo nos es cristo!", "él llevó nuestro dolor"])),
            ContentBlock::chorus(lines(&["gloria, gloria", "aleluya"])),
            ContentBlock::stanza(2, lines(&["vive siempre en oración", "y tendrás su bendición"])),
        ]
    );
}

#[test]
fn explicit_hymn_takes_marker_numbers_verbatim() {
    let hymns = segment(HYMNAL);
    let hymn = only(&hymns, 2);

    assert_eq!(hymn.title, "castillo fuerte es nuestro dios");
    let numbers: Vec<Option<u32>> = hymn.content.iter().map(|b| b.stanza_number).collect();
    assert_eq!(numbers, vec![Some(1), Some(2), None, Some(4)]);
    assert_eq!(hymn.content[2].kind, BlockKind::Chorus);
    assert_eq!(hymn.content[2].lines, lines(&["su reino es"]));
}

#[test]
fn hymn_176_swallows_title_like_lines() {
    let hymns = segment(HYMNAL);
    let hymn = only(&hymns, 176);

    assert_eq!(hymn.title, "cuando allá se pase lista");
    assert_eq!(
        hymn.content,
        vec![
            ContentBlock::stanza(1, lines(&["cuando la trompeta suene", "en aquel día final"])),
            ContentBlock::stanza(
                2,
                lines(&["en la mañana clara y bella", "cuando los salvos se levanten"])
            ),
            ContentBlock::stanza(3, lines(&["trabajemos por el maestro"])),
        ]
    );
}

// ── Properties ───────────────────────────────────────────────────────────────

#[test]
fn no_block_is_empty() {
    let noisy = "7. DIOS ES AMOR\n\n\n   \nCORO\n\n\nCORO\nuna\n\n\n8. OTRO HIMNO AQUI\n\n";
    for text in [HYMNAL, noisy] {
        for hymn in segment(text) {
            for block in &hymn.content {
                assert!(!block.lines.is_empty(), "empty block in hymn {}", hymn.number);
                assert!(!block.lines[0].is_empty());
                assert!(!block.lines[block.lines.len() - 1].is_empty());
            }
        }
    }
}

#[test]
fn chorus_marker_is_never_content() {
    for hymn in segment(HYMNAL) {
        for block in &hymn.content {
            assert!(block
                .lines
                .iter()
                .all(|l| !l.to_uppercase().starts_with("CORO")));
        }
    }
}

#[test]
fn line_order_is_preserved() {
    let hymns = segment(HYMNAL);
    let flattened: Vec<&str> = only(&hymns, 1)
        .content
        .iter()
        .flat_map(|b| b.lines.iter().map(String::as_str))
        .collect();
    assert_eq!(
        flattened,
        vec![
            "¡oh qué amigo nos es cristo!",
            "él llevó nuestro dolor",
            "gloria, gloria",
            "aleluya",
            "vive siempre en oración",
            "y tendrás su bendición",
        ]
    );
}

#[test]
fn implicit_numbers_count_up_in_closure_order() {
    let text = "9. TAL COMO SOY\na\n\nb\n\n\nc\n\nd";
    let numbers: Vec<u32> = segment(text)[0]
        .stanzas()
        .filter_map(|b| b.stanza_number)
        .collect();
    assert_eq!(numbers, vec![1, 2, 3, 4]);
}

#[test]
fn crlf_text_segments_like_lf_text() {
    let lf = "1. OH QUE AMIGO NOS ES CRISTO\nlinea uno\n\nlinea dos";
    let crlf = lf.replace('\n', "\r\n");
    assert_eq!(segment(lf), segment(&crlf));
}

#[test]
fn empty_and_untitled_input_yield_nothing() {
    assert!(segment("").is_empty());
    assert!(segment("prefacio\n\n1 sin punto\n0. CERO NO ES HIMNO").is_empty());
}

#[test]
fn records_serialise_with_lowercase_kinds() {
    let hymns = segment("1. OH QUE AMIGO NOS ES CRISTO\nCORO\ngloria\n\nlinea");
    let json = serde_json::to_value(&hymns).unwrap();
    assert_eq!(json[0]["content"][0]["kind"], "chorus");
    assert!(json[0]["content"][0].get("stanza_number").is_none());
    assert_eq!(json[0]["content"][1]["kind"], "stanza");
    assert_eq!(json[0]["content"][1]["stanza_number"], 1);
}
