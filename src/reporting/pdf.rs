use std::fs;
use std::path::{Path, PathBuf};

use chrono::Utc;
use printpdf::{BuiltinFont, Mm, PdfDocument, PdfLayerReference};

use crate::errors::MollyError;

const PAGE_WIDTH_MM: f64 = 210.0;
const PAGE_HEIGHT_MM: f64 = 297.0;
const MARGIN_MM: f64 = 20.0;
const LINE_HEIGHT_MM: f64 = 6.0;

/// A single parsed markdown block, ready to be laid out on a page.
enum Block {
    Title(String),
    H1(String),
    H2(String),
    H3(String),
    ListItem(String),
    CodeBlock(Vec<String>),
    Spacer,
    Normal(String),
}

/// Line-by-line stateful markdown parse: headings, bullet items, fenced code
/// blocks and `---` rules. Anything else becomes a normal paragraph.
fn parse_markdown(markdown: &str) -> Vec<Block> {
    let mut blocks = Vec::new();
    let mut in_code_block = false;
    let mut current_code: Vec<String> = Vec::new();

    for line in markdown.lines() {
        let stripped = line.trim();

        if stripped.starts_with("```") {
            if in_code_block {
                blocks.push(Block::CodeBlock(std::mem::take(&mut current_code)));
                in_code_block = false;
            } else {
                in_code_block = true;
            }
            continue;
        }

        if in_code_block {
            current_code.push(line.to_string());
            continue;
        }

        if stripped == "---" {
            blocks.push(Block::Spacer);
        } else if let Some(rest) = stripped.strip_prefix("#### ") {
            blocks.push(Block::H3(rest.to_string()));
        } else if let Some(rest) = stripped.strip_prefix("### ") {
            blocks.push(Block::H3(rest.to_string()));
        } else if let Some(rest) = stripped.strip_prefix("## ") {
            blocks.push(Block::H2(rest.to_string()));
        } else if let Some(rest) = stripped.strip_prefix("# ") {
            blocks.push(Block::H1(rest.to_string()));
        } else if let Some(rest) = stripped.strip_prefix("- ") {
            blocks.push(Block::ListItem(rest.to_string()));
        } else if !stripped.is_empty() {
            blocks.push(Block::Normal(strip_markdown_emphasis(stripped)));
        }
    }

    if in_code_block && !current_code.is_empty() {
        blocks.push(Block::CodeBlock(current_code));
    }

    blocks
}

/// printpdf has no rich-text inline markup; bold/severity markers are
/// rendered as plain text rather than attempting run-splitting.
fn strip_markdown_emphasis(text: &str) -> String {
    text.replace("**", "")
}

/// Folder name for a per-host report: `Escaneo_IP_<ip_with_underscores>_<YYYYMMDD>`.
pub fn build_scan_folder_name(host_ip: &str) -> String {
    format!(
        "Escaneo_IP_{}_{}",
        host_ip.replace('.', "_"),
        Utc::now().format("%Y%m%d")
    )
}

struct Cursor {
    y: f64,
}

impl Cursor {
    fn new() -> Self {
        Self { y: PAGE_HEIGHT_MM - MARGIN_MM }
    }

    fn advance(&mut self, amount: f64) -> bool {
        self.y -= amount;
        self.y > MARGIN_MM
    }
}

fn write_line(layer: &PdfLayerReference, font: &printpdf::IndirectFontRef, text: &str, size: f64, cursor: &mut Cursor) {
    if !cursor.advance(LINE_HEIGHT_MM) {
        return;
    }
    layer.use_text(text, size, Mm(MARGIN_MM), Mm(cursor.y), font);
}

/// Render a markdown report to a PDF file on disk, writing it under
/// `output_dir/<folder>/<filename>` where `folder` is `host_ip`'s scan
/// folder name when given, else `scan_session_name` verbatim. Returns the
/// full path to the written file.
pub fn generate_pdf_report(
    output_dir: &Path,
    markdown: &str,
    filename: &str,
    scan_session_name: &str,
    host_ip: Option<&str>,
) -> Result<PathBuf, MollyError> {
    let folder = match host_ip {
        Some(ip) => build_scan_folder_name(ip),
        None => scan_session_name.to_string(),
    };
    let session_dir = output_dir.join(folder);
    fs::create_dir_all(&session_dir)
        .map_err(|e| MollyError::Internal(format!("failed to create report directory: {}", e)))?;

    let (doc, page1, layer1) = PdfDocument::new("Molly Security Report", Mm(PAGE_WIDTH_MM), Mm(PAGE_HEIGHT_MM), "Layer 1");
    let font_regular = doc
        .add_builtin_font(BuiltinFont::Helvetica)
        .map_err(|e| MollyError::Internal(format!("failed to load PDF font: {}", e)))?;
    let font_bold = doc
        .add_builtin_font(BuiltinFont::HelveticaBold)
        .map_err(|e| MollyError::Internal(format!("failed to load PDF font: {}", e)))?;

    let mut layer = doc.get_page(page1).get_layer(layer1);
    let mut cursor = Cursor::new();

    layer.use_text("Security Assessment Report Generated by Molly", 18.0, Mm(MARGIN_MM), Mm(cursor.y), &font_bold);
    cursor.advance(LINE_HEIGHT_MM * 2.0);
    write_line(&layer, &font_regular, &format!("Session: {}", scan_session_name), 12.0, &mut cursor);
    if let Some(ip) = host_ip {
        write_line(&layer, &font_regular, &format!("Host: {}", ip), 12.0, &mut cursor);
    }
    write_line(&layer, &font_regular, &format!("Generated: {}", Utc::now().to_rfc3339()), 10.0, &mut cursor);

    let (mut page, mut layer_idx) = doc.add_page(Mm(PAGE_WIDTH_MM), Mm(PAGE_HEIGHT_MM), "Layer 1");
    layer = doc.get_page(page).get_layer(layer_idx);
    cursor = Cursor::new();

    for block in parse_markdown(markdown) {
        if cursor.y <= MARGIN_MM + LINE_HEIGHT_MM {
            let next = doc.add_page(Mm(PAGE_WIDTH_MM), Mm(PAGE_HEIGHT_MM), "Layer 1");
            page = next.0;
            layer_idx = next.1;
            layer = doc.get_page(page).get_layer(layer_idx);
            cursor = Cursor::new();
        }

        match block {
            Block::Title(text) | Block::H1(text) => write_line(&layer, &font_bold, &text, 16.0, &mut cursor),
            Block::H2(text) => write_line(&layer, &font_bold, &text, 13.0, &mut cursor),
            Block::H3(text) => write_line(&layer, &font_bold, &text, 11.0, &mut cursor),
            Block::ListItem(text) => write_line(&layer, &font_regular, &format!("\u{2022} {}", text), 10.0, &mut cursor),
            Block::CodeBlock(lines) => {
                for line in lines {
                    write_line(&layer, &font_regular, &line, 9.0, &mut cursor);
                }
            }
            Block::Spacer => {
                cursor.advance(LINE_HEIGHT_MM);
            }
            Block::Normal(text) => write_line(&layer, &font_regular, &text, 10.0, &mut cursor),
        }
    }

    let file_path = session_dir.join(filename);
    let file = fs::File::create(&file_path)
        .map_err(|e| MollyError::Internal(format!("failed to create report file: {}", e)))?;
    let mut writer = std::io::BufWriter::new(file);
    doc.save(&mut writer)
        .map_err(|e| MollyError::Internal(format!("failed to write PDF: {}", e)))?;

    Ok(file_path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_scan_folder_name_replaces_dots() {
        let folder = build_scan_folder_name("192.168.1.38");
        assert!(folder.starts_with("Escaneo_IP_192_168_1_38_"));
    }

    #[test]
    fn test_parse_markdown_headings_and_list() {
        let md = "# Title\n## Section\n- item one\n---\nplain text\n";
        let blocks = parse_markdown(md);
        assert!(matches!(blocks[0], Block::H1(_)));
        assert!(matches!(blocks[1], Block::H2(_)));
        assert!(matches!(blocks[2], Block::ListItem(_)));
        assert!(matches!(blocks[3], Block::Spacer));
        assert!(matches!(blocks[4], Block::Normal(_)));
    }

    #[test]
    fn test_parse_markdown_code_block() {
        let md = "```json\n{\"a\": 1}\n```\n";
        let blocks = parse_markdown(md);
        assert_eq!(blocks.len(), 1);
        match &blocks[0] {
            Block::CodeBlock(lines) => assert_eq!(lines[0], "{\"a\": 1}"),
            _ => panic!("expected code block"),
        }
    }

    #[test]
    fn test_generate_pdf_report_writes_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = generate_pdf_report(
            dir.path(),
            "# Report\n\nSome content.\n",
            "test_report.pdf",
            "Escaneo_IA_test",
            None,
        )
        .unwrap();
        assert!(path.exists());
        assert!(path.to_string_lossy().contains("Escaneo_IA_test"));
    }

    #[test]
    fn test_generate_pdf_report_with_host_ip_uses_scan_folder_name() {
        let dir = tempfile::tempdir().unwrap();
        let path = generate_pdf_report(dir.path(), "# Report\n", "detailed.pdf", "ignored", Some("10.0.0.5"))
            .unwrap();
        assert!(path.to_string_lossy().contains("Escaneo_IP_10_0_0_5_"));
    }
}
