//! Tokenizer for HTML markup.
//!
//! Every token keeps the exact source slice it was read from so that a
//! document can be serialized back byte-for-byte.

use crate::Attribute;

/// Elements whose content is raw text (no nested markup is recognized).
pub(crate) const RAW_TEXT_ELEMENTS: &[&str] = &["script", "style", "textarea", "title"];

/// Token types produced by the tokenizer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Token<'a> {
    /// Character data, still entity-encoded.
    Text(&'a str),
    /// Opening tag: `<name attr="value">` or `<name />`
    OpenTag {
        raw: &'a str,
        name: String,
        attrs: Vec<Attribute>,
        self_closing: bool,
    },
    /// Closing tag: `</name>`
    CloseTag { raw: &'a str, name: String },
    /// `<!-- ... -->`
    Comment(&'a str),
    /// `<!DOCTYPE ...>`, `<?xml ...?>` and other markup declarations.
    Declaration(&'a str),
}

pub(crate) struct Tokenizer<'a> {
    input: &'a str,
    pos: usize,
    /// Set after a raw-text element opens; holds its lowercase name.
    raw_text: Option<String>,
}

impl<'a> Tokenizer<'a> {
    pub(crate) fn new(input: &'a str) -> Self {
        Self {
            input,
            pos: 0,
            raw_text: None,
        }
    }

    fn is_name_char(b: u8) -> bool {
        b.is_ascii_alphanumeric() || b == b'-' || b == b'_' || b == b':' || b == b'.'
    }

    /// Reads raw text up to the matching `</name`, case-insensitively.
    fn next_raw_text(&mut self, name: &str) -> Option<Token<'a>> {
        let remaining = &self.input[self.pos..];
        let needle = format!("</{}", name);
        let lower = remaining.to_ascii_lowercase();
        let end = lower.find(&needle).unwrap_or(remaining.len());
        if end == 0 {
            return None;
        }
        self.pos += end;
        Some(Token::Text(&remaining[..end]))
    }

    /// Attempts to read an open tag starting at `self.pos` (which is a `<`).
    fn read_open_tag(&mut self) -> Option<Token<'a>> {
        let bytes = self.input.as_bytes();
        let start = self.pos;
        let mut i = start + 1;

        let name_start = i;
        while i < bytes.len() && Self::is_name_char(bytes[i]) {
            i += 1;
        }
        let name = self.input[name_start..i].to_ascii_lowercase();

        let mut attrs = Vec::new();
        loop {
            while i < bytes.len() && bytes[i].is_ascii_whitespace() {
                i += 1;
            }
            if i >= bytes.len() {
                return None;
            }
            match bytes[i] {
                b'>' => {
                    let raw = &self.input[start..=i];
                    self.pos = i + 1;
                    return Some(Token::OpenTag {
                        raw,
                        name,
                        attrs,
                        self_closing: false,
                    });
                }
                b'/' if bytes.get(i + 1) == Some(&b'>') => {
                    let raw = &self.input[start..i + 2];
                    self.pos = i + 2;
                    return Some(Token::OpenTag {
                        raw,
                        name,
                        attrs,
                        self_closing: true,
                    });
                }
                b'/' => {
                    i += 1;
                }
                _ => {
                    let attr_start = i;
                    while i < bytes.len()
                        && !bytes[i].is_ascii_whitespace()
                        && bytes[i] != b'='
                        && bytes[i] != b'>'
                        && !(bytes[i] == b'/' && bytes.get(i + 1) == Some(&b'>'))
                    {
                        i += 1;
                    }
                    let attr_name = self.input[attr_start..i].to_ascii_lowercase();

                    let mut j = i;
                    while j < bytes.len() && bytes[j].is_ascii_whitespace() {
                        j += 1;
                    }
                    if j < bytes.len() && bytes[j] == b'=' {
                        j += 1;
                        while j < bytes.len() && bytes[j].is_ascii_whitespace() {
                            j += 1;
                        }
                        if j >= bytes.len() {
                            return None;
                        }
                        let value = match bytes[j] {
                            quote @ (b'"' | b'\'') => {
                                let value_start = j + 1;
                                let close = self.input[value_start..].find(quote as char)?;
                                j = value_start + close + 1;
                                &self.input[value_start..value_start + close]
                            }
                            _ => {
                                let value_start = j;
                                while j < bytes.len()
                                    && !bytes[j].is_ascii_whitespace()
                                    && bytes[j] != b'>'
                                {
                                    j += 1;
                                }
                                &self.input[value_start..j]
                            }
                        };
                        attrs.push(Attribute::new(attr_name, Some(value.to_string())));
                        i = j;
                    } else {
                        attrs.push(Attribute::new(attr_name, None));
                    }
                }
            }
        }
    }

    fn read_close_tag(&mut self) -> Option<Token<'a>> {
        let remaining = &self.input[self.pos..];
        let end = remaining.find('>')?;
        let raw = &remaining[..=end];
        let name: String = raw[2..raw.len() - 1]
            .trim()
            .chars()
            .take_while(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | ':' | '.'))
            .collect::<String>()
            .to_ascii_lowercase();
        self.pos += end + 1;
        Some(Token::CloseTag { raw, name })
    }

    /// Emits text starting at `self.pos`, skipping at least `min` bytes.
    fn text_from(&mut self, min: usize) -> Token<'a> {
        let remaining = &self.input[self.pos..];
        let end = remaining[min..]
            .find('<')
            .map(|p| p + min)
            .unwrap_or(remaining.len());
        self.pos += end;
        Token::Text(&remaining[..end])
    }
}

impl<'a> Iterator for Tokenizer<'a> {
    type Item = Token<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        if let Some(name) = self.raw_text.take() {
            if let Some(token) = self.next_raw_text(&name) {
                return Some(token);
            }
        }

        if self.pos >= self.input.len() {
            return None;
        }

        let remaining = &self.input[self.pos..];
        if !remaining.starts_with('<') {
            return Some(self.text_from(0));
        }

        let next = remaining.as_bytes().get(1).copied();
        match next {
            Some(b'!') if remaining.starts_with("<!--") => {
                let end = remaining[4..]
                    .find("-->")
                    .map(|p| p + 4 + 3)
                    .unwrap_or(remaining.len());
                self.pos += end;
                Some(Token::Comment(&remaining[..end]))
            }
            Some(b'!') | Some(b'?') => match remaining.find('>') {
                Some(end) => {
                    self.pos += end + 1;
                    Some(Token::Declaration(&remaining[..=end]))
                }
                None => Some(self.text_from(1)),
            },
            Some(b'/') if remaining.as_bytes().get(2).is_some_and(u8::is_ascii_alphabetic) => {
                match self.read_close_tag() {
                    Some(token) => Some(token),
                    None => Some(self.text_from(1)),
                }
            }
            Some(b) if b.is_ascii_alphabetic() => {
                let saved = self.pos;
                match self.read_open_tag() {
                    Some(token) => {
                        if let Token::OpenTag {
                            ref name,
                            self_closing: false,
                            ..
                        } = token
                        {
                            if RAW_TEXT_ELEMENTS.contains(&name.as_str()) {
                                self.raw_text = Some(name.clone());
                            }
                        }
                        Some(token)
                    }
                    None => {
                        // Unterminated tag - the rest is text
                        self.pos = saved;
                        Some(self.text_from(1))
                    }
                }
            }
            _ => Some(self.text_from(1)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(input: &str) -> Vec<Token<'_>> {
        Tokenizer::new(input).collect()
    }

    #[test]
    fn plain_text_is_one_token() {
        assert_eq!(tokens("hello world"), vec![Token::Text("hello world")]);
    }

    #[test]
    fn open_tag_with_attributes() {
        let toks = tokens(r#"<span class="a b" data-field='x' hidden>"#);
        match &toks[0] {
            Token::OpenTag {
                name,
                attrs,
                self_closing,
                ..
            } => {
                assert_eq!(name, "span");
                assert!(!self_closing);
                assert_eq!(attrs.len(), 3);
                assert_eq!(attrs[0].value(), Some("a b"));
                assert_eq!(attrs[1].name(), "data-field");
                assert_eq!(attrs[1].value(), Some("x"));
                assert_eq!(attrs[2].value(), None);
            }
            other => panic!("unexpected token {:?}", other),
        }
    }

    #[test]
    fn quoted_gt_does_not_end_tag() {
        let toks = tokens(r#"<a title="1 > 0">x</a>"#);
        assert!(matches!(&toks[0], Token::OpenTag { raw, .. } if *raw == r#"<a title="1 > 0">"#));
        assert_eq!(toks[1], Token::Text("x"));
    }

    #[test]
    fn self_closing_tag() {
        let toks = tokens("<br/>");
        assert!(matches!(
            &toks[0],
            Token::OpenTag {
                self_closing: true,
                ..
            }
        ));
    }

    #[test]
    fn comment_and_doctype() {
        let toks = tokens("<!DOCTYPE html><!-- note -->x");
        assert_eq!(toks[0], Token::Declaration("<!DOCTYPE html>"));
        assert_eq!(toks[1], Token::Comment("<!-- note -->"));
        assert_eq!(toks[2], Token::Text("x"));
    }

    #[test]
    fn lone_lt_is_text() {
        let toks = tokens("a < b");
        let joined: String = toks
            .iter()
            .map(|t| match t {
                Token::Text(s) => *s,
                _ => "",
            })
            .collect();
        assert_eq!(joined, "a < b");
    }

    #[test]
    fn script_content_is_raw() {
        let toks = tokens(r#"<script>if (a<b) { x = "<p>"; }</script>"#);
        assert_eq!(toks[1], Token::Text(r#"if (a<b) { x = "<p>"; }"#));
        assert!(matches!(&toks[2], Token::CloseTag { name, .. } if name == "script"));
    }

    #[test]
    fn unterminated_tag_is_text() {
        let toks = tokens("x <span class=");
        let last = toks.last().unwrap();
        assert!(matches!(last, Token::Text(s) if s.starts_with("<span")));
    }
}
