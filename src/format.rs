//! Cleanup and column wrapping for generated commit messages.
//!
//! Both functions are pure and total over all string inputs.

/// List markers that get a hanging indent when their line is wrapped.
const BULLET_MARKERS: &[&str] = &["- ", "* ", "+ ", "\u{2022} "];

/// Wrap every line of `raw` so that it fits in `column_width` characters.
///
/// Lines are wrapped independently at whitespace. Blank lines are kept where
/// they are, lines that already fit are left alone apart from trailing
/// whitespace, and a token that cannot fit is placed on its own line rather
/// than being split.
pub fn wrap_message(raw: &str, column_width: usize) -> String {
   if raw.is_empty() {
      return String::new();
   }

   let mut out: Vec<String> = Vec::new();
   for line in raw.split('\n') {
      // Also drops the '\r' of CRLF input
      let line = line.trim_end();
      if line.is_empty() {
         out.push(String::new());
      } else if line.chars().count() <= column_width {
         out.push(line.to_string());
      } else {
         out.extend(wrap_line(line, column_width));
      }
   }

   out.join("\n")
}

/// Greedy word wrap of a single over-long line.
fn wrap_line(line: &str, width: usize) -> Vec<String> {
   let body = line.trim_start();
   let indent = &line[..line.len() - body.len()];

   let (marker, rest) = BULLET_MARKERS
      .iter()
      .find(|m| body.starts_with(**m))
      .map_or(("", body), |m| (*m, &body[m.len()..]));

   let continuation = format!("{indent}{}", " ".repeat(marker.chars().count()));
   let continuation_len = continuation.chars().count();

   let mut lines = Vec::new();
   let mut current = format!("{indent}{marker}");
   let mut current_len = current.chars().count();
   let mut line_has_word = false;

   for word in rest.split_whitespace() {
      let word_len = word.chars().count();

      if !line_has_word && !marker.is_empty() && current_len + word_len > width {
         // A bullet marker is a break point of its own
         lines.push(current.trim_end().to_string());
         current = format!("{continuation}{word}");
         current_len = continuation_len + word_len;
         line_has_word = true;
      } else if !line_has_word {
         // First word on a line is always taken, even when too long
         current.push_str(word);
         current_len += word_len;
         line_has_word = true;
      } else if current_len + 1 + word_len <= width {
         current.push(' ');
         current.push_str(word);
         current_len += 1 + word_len;
      } else {
         lines.push(std::mem::replace(&mut current, format!("{continuation}{word}")));
         current_len = continuation_len + word_len;
      }
   }

   lines.push(current.trim_end().to_string());
   lines
}

/// Strip presentation noise models like to add around a commit message: a
/// single enclosing markdown code fence and blank lines at either end.
pub fn clean_response(raw: &str) -> String {
   let lines = trim_blank_lines(raw.lines().collect());

   let fenced = lines.len() >= 2
      && lines[0].trim_start().starts_with("```")
      && lines[lines.len() - 1].trim() == "```";

   let unfenced = if fenced {
      trim_blank_lines(lines[1..lines.len() - 1].to_vec())
   } else {
      lines
   };

   unfenced.join("\n")
}

fn trim_blank_lines(lines: Vec<&str>) -> Vec<&str> {
   let Some(start) = lines.iter().position(|l| !l.trim().is_empty()) else {
      return Vec::new();
   };
   let end = lines
      .iter()
      .rposition(|l| !l.trim().is_empty())
      .map_or(start, |i| i + 1);
   lines[start..end].to_vec()
}
