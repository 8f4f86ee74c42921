//! HTML preview page for a built font.

use ligafont_engine::{LigatureMapping, TransformReport};

/// Renders `<name>_preview.html`: every ligature typed in the new font next
/// to its sequence, glyph name and private-use code.
pub fn render(font_name: &str, mapping: &LigatureMapping, report: &TransformReport) -> String {
    let family = escape(font_name);
    let mut rows = String::new();
    for (sequence, glyph) in mapping.iter() {
        let code = report
            .glyph_codes
            .get(glyph)
            .map(|code| format!("U+{code:04X}"))
            .unwrap_or_default();
        let sequence = escape(sequence);
        rows.push_str(&format!(
            "      <tr><td class=\"testarea\">{sequence}</td><td>{sequence}</td>\
             <td>{}</td><td>{code}</td></tr>\n",
            escape(glyph)
        ));
    }

    format!(
        r#"<!DOCTYPE html>
<html>
  <head>
    <meta charset="utf-8">
    <title>{family}</title>
    <style type="text/css">
      @font-face {{
        font-family: "{family}";
        src: url("{family}.ttf") format("truetype");
      }}

      .testarea {{
        font-family: "{family}" !important;
        font-size: 30px;
        display: block;
      }}
    </style>
  </head>
  <body>
    <table>
      <tr>
        <th>Icon</th>
        <th>Ligature</th>
        <th>Name</th>
        <th>Code</th>
      </tr>
{rows}    </table>
  </body>
</html>
"#
    )
}

fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
    out
}
