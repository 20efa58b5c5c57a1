//! Block → HTML rendering.

use chapterbook_shared::Block;

/// CSS class for paragraphs rendered without first-line indent.
pub const NO_INDENT_CLASS: &str = "ni";

/// Render one block as a single line of HTML.
pub fn render_block(block: &Block) -> String {
    match block {
        Block::Heading(text) => format!("<h1>{text}</h1>"),
        Block::Divider => "<hr>".to_string(),
        Block::Paragraph {
            text,
            indented: true,
        } => format!("<p>{text}</p>"),
        Block::Paragraph {
            text,
            indented: false,
        } => format!(r#"<p class="{NO_INDENT_CLASS}">{text}</p>"#),
    }
}

/// Render a block sequence, one block per line.
pub fn render_blocks(blocks: &[Block]) -> String {
    blocks
        .iter()
        .map(render_block)
        .collect::<Vec<_>>()
        .join("\n")
}
