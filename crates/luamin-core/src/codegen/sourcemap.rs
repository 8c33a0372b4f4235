use crate::errors::Result;
use base64::Engine;
use luamin_parser::SourcePosition;
use serde::{Deserialize, Serialize};

/// A source map builder following the Source Map v3 specification
/// https://sourcemaps.info/spec.html
#[derive(Debug, Default)]
pub struct SourceMapBuilder {
    file: Option<String>,
    sources: Vec<String>,
    sources_content: Vec<Option<String>>,
    mappings: Vec<Mapping>,
    generated_line: usize,
    generated_column: usize,
}

#[derive(Debug, Clone)]
struct Mapping {
    generated_line: usize,
    generated_column: usize,
    source_index: usize,
    source_line: usize,
    source_column: usize,
    name: Option<String>,
}

/// The JSON structure for source maps
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceMap {
    pub version: u8,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
    pub sources: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub sources_content: Vec<Option<String>>,
    #[serde(default)]
    pub names: Vec<String>,
    pub mappings: String,
}

impl SourceMapBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_file(&mut self, file: impl Into<String>) {
        self.file = Some(file.into());
    }

    /// Add a source file and return its index
    pub fn add_source(&mut self, source_file: &str) -> usize {
        if let Some(idx) = self.sources.iter().position(|s| s == source_file) {
            idx
        } else {
            self.sources.push(source_file.to_string());
            self.sources.len() - 1
        }
    }

    /// Attach the original text of a registered source.
    pub fn set_source_content(&mut self, source_index: usize, content: impl Into<String>) {
        if self.sources_content.len() <= source_index {
            self.sources_content.resize(source_index + 1, None);
        }
        self.sources_content[source_index] = Some(content.into());
    }

    /// Map the current generated position to `position` in `source_index`.
    ///
    /// A later mapping at the same generated position replaces the earlier
    /// one, so nested fragments starting together resolve to the innermost.
    pub fn add_mapping(
        &mut self,
        source_index: usize,
        position: SourcePosition,
        name: Option<&str>,
    ) {
        let mapping = Mapping {
            generated_line: self.generated_line,
            generated_column: self.generated_column,
            source_index,
            source_line: position.line.saturating_sub(1) as usize,
            source_column: position.column as usize,
            name: name.map(str::to_string),
        };

        match self.mappings.last_mut() {
            Some(last)
                if last.generated_line == mapping.generated_line
                    && last.generated_column == mapping.generated_column =>
            {
                *last = mapping;
            }
            _ => self.mappings.push(mapping),
        }
    }

    /// Advance the generated position by writing text. Columns count
    /// bytes, the same unit the lexer uses for source columns.
    pub fn advance(&mut self, text: &str) {
        for ch in text.chars() {
            if ch == '\n' {
                self.generated_line += 1;
                self.generated_column = 0;
            } else {
                self.generated_column += ch.len_utf8();
            }
        }
    }

    /// Build the final source map
    pub fn build(self) -> SourceMap {
        let mut names: Vec<String> = Vec::new();
        let name_indices: Vec<Option<usize>> = self
            .mappings
            .iter()
            .map(|mapping| {
                mapping.name.as_ref().map(|n| {
                    if let Some(idx) = names.iter().position(|existing| existing == n) {
                        idx
                    } else {
                        names.push(n.clone());
                        names.len() - 1
                    }
                })
            })
            .collect();

        let mappings = Self::encode_mappings(&self.mappings, &name_indices);
        let mut sources_content = self.sources_content;
        if !sources_content.is_empty() {
            sources_content.resize(self.sources.len(), None);
        }

        SourceMap {
            version: 3,
            file: self.file,
            sources: self.sources,
            sources_content,
            names,
            mappings,
        }
    }

    /// Encode mappings using VLQ (Variable Length Quantity) encoding
    fn encode_mappings(mappings: &[Mapping], name_indices: &[Option<usize>]) -> String {
        let mut result = String::new();
        let mut prev_generated_line = 0;
        let mut prev_generated_col = 0;
        let mut prev_source_index = 0;
        let mut prev_source_line = 0;
        let mut prev_source_col = 0;
        let mut prev_name_index = 0;

        for (mapping, name_index) in mappings.iter().zip(name_indices) {
            while prev_generated_line < mapping.generated_line {
                result.push(';');
                prev_generated_line += 1;
                prev_generated_col = 0;
            }

            if !result.is_empty() && !result.ends_with(';') {
                result.push(',');
            }

            // [generated_col, source_index, source_line, source_col, name_index], all deltas
            let generated_col_delta = mapping.generated_column as i64 - prev_generated_col as i64;
            result.push_str(&Self::encode_vlq(generated_col_delta));
            prev_generated_col = mapping.generated_column;

            let source_index_delta = mapping.source_index as i64 - prev_source_index as i64;
            result.push_str(&Self::encode_vlq(source_index_delta));
            prev_source_index = mapping.source_index;

            let source_line_delta = mapping.source_line as i64 - prev_source_line as i64;
            result.push_str(&Self::encode_vlq(source_line_delta));
            prev_source_line = mapping.source_line;

            let source_col_delta = mapping.source_column as i64 - prev_source_col as i64;
            result.push_str(&Self::encode_vlq(source_col_delta));
            prev_source_col = mapping.source_column;

            if let Some(name_idx) = *name_index {
                let name_index_delta = name_idx as i64 - prev_name_index;
                result.push_str(&Self::encode_vlq(name_index_delta));
                prev_name_index = name_idx as i64;
            }
        }

        result
    }

    /// Encode a single value using VLQ Base64 encoding
    pub(crate) fn encode_vlq(value: i64) -> String {
        const BASE64_CHARS: &[u8] =
            b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789+/";

        let mut vlq = if value < 0 {
            ((-value) << 1) | 1
        } else {
            value << 1
        };

        let mut result = String::new();
        loop {
            let mut digit = (vlq & 0x1F) as u8;
            vlq >>= 5;
            if vlq > 0 {
                digit |= 0x20;
            }
            result.push(BASE64_CHARS[digit as usize] as char);
            if vlq == 0 {
                break;
            }
        }
        result
    }
}

impl SourceMap {
    /// Serialize to JSON string
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Generate the inline source map data URI
    pub fn to_data_uri(&self) -> Result<String> {
        let json = self.to_json()?;
        let encoded = base64::engine::general_purpose::STANDARD.encode(json.as_bytes());
        Ok(format!(
            "data:application/json;charset=utf-8;base64,{}",
            encoded
        ))
    }

    /// Generate the source mapping URL comment for Lua
    pub fn to_comment(&self) -> Result<String> {
        let data_uri = self.to_data_uri()?;
        Ok(format!("--# sourceMappingURL={}", data_uri))
    }

    /// Comment pointing at an external map file
    pub fn url_comment(map_file: &str) -> String {
        format!("--# sourceMappingURL={}", map_file)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_map_builder() {
        let mut builder = SourceMapBuilder::new();
        builder.set_file("main.min.lua");
        let source = builder.add_source("main.lua");
        builder.add_mapping(source, SourcePosition::new(1, 6), Some("counter"));
        builder.advance("a");

        let source_map = builder.build();
        assert_eq!(source_map.version, 3);
        assert_eq!(source_map.file.as_deref(), Some("main.min.lua"));
        assert_eq!(source_map.sources, vec!["main.lua".to_string()]);
        assert_eq!(source_map.names, vec!["counter".to_string()]);
        assert_eq!(source_map.mappings, "AAAMA");
    }

    #[test]
    fn test_vlq_encoding() {
        assert_eq!(SourceMapBuilder::encode_vlq(0), "A");
        assert_eq!(SourceMapBuilder::encode_vlq(1), "C");
        assert_eq!(SourceMapBuilder::encode_vlq(-1), "D");
        assert_eq!(SourceMapBuilder::encode_vlq(15), "e");
        assert_eq!(SourceMapBuilder::encode_vlq(-15), "f");
        assert_eq!(SourceMapBuilder::encode_vlq(16), "gB");
        assert_eq!(SourceMapBuilder::encode_vlq(123), "2H");
    }

    #[test]
    fn test_same_position_keeps_innermost() {
        let mut builder = SourceMapBuilder::new();
        let source = builder.add_source("main.lua");
        builder.add_mapping(source, SourcePosition::new(1, 0), None);
        builder.add_mapping(source, SourcePosition::new(1, 4), Some("x"));
        builder.advance("x");

        let source_map = builder.build();
        assert_eq!(source_map.mappings, "AAAIA");
        assert_eq!(source_map.names, vec!["x".to_string()]);
    }

    #[test]
    fn test_multiline_mappings() {
        let mut builder = SourceMapBuilder::new();
        let source = builder.add_source("main.lua");
        builder.add_mapping(source, SourcePosition::new(1, 0), None);
        builder.advance("--#pragma\n");
        builder.add_mapping(source, SourcePosition::new(2, 0), None);
        builder.advance("x=1");

        let source_map = builder.build();
        assert_eq!(source_map.mappings, "AAAA;AACA");
    }

    #[test]
    fn test_multiple_sources() {
        let mut builder = SourceMapBuilder::new();
        let main = builder.add_source("main.lua");
        let util = builder.add_source("util.lua");
        assert_eq!(builder.add_source("main.lua"), main);

        builder.add_mapping(util, SourcePosition::new(1, 0), None);
        builder.advance("return 1 ");
        builder.add_mapping(main, SourcePosition::new(1, 0), None);

        let source_map = builder.build();
        assert_eq!(source_map.sources.len(), 2);
        assert_eq!(source_map.mappings, "ACAA,SDAA");
    }

    #[test]
    fn test_name_deduplication() {
        let mut builder = SourceMapBuilder::new();
        let source = builder.add_source("main.lua");
        builder.add_mapping(source, SourcePosition::new(1, 0), Some("foo"));
        builder.advance("a");
        builder.add_mapping(source, SourcePosition::new(1, 4), Some("foo"));
        builder.advance("a");
        builder.add_mapping(source, SourcePosition::new(1, 8), Some("bar"));
        builder.advance("b");

        let source_map = builder.build();
        assert_eq!(source_map.names, vec!["foo".to_string(), "bar".to_string()]);
    }

    #[test]
    fn test_columns_count_bytes() {
        let mut builder = SourceMapBuilder::new();
        let source = builder.add_source("main.lua");
        builder.advance("s='\u{e9}'");
        builder.add_mapping(source, SourcePosition::new(1, 7), None);
        builder.advance(";");

        // Six bytes, five chars.
        let source_map = builder.build();
        assert_eq!(source_map.mappings, "MAAO");
    }

    #[test]
    fn test_source_content_is_padded() {
        let mut builder = SourceMapBuilder::new();
        builder.add_source("main.lua");
        let util = builder.add_source("util.lua");
        builder.set_source_content(util, "return 1");

        let source_map = builder.build();
        assert_eq!(
            source_map.sources_content,
            vec![None, Some("return 1".to_string())]
        );
    }

    #[test]
    fn test_json_uses_camel_case() {
        let mut builder = SourceMapBuilder::new();
        let source = builder.add_source("main.lua");
        builder.set_source_content(source, "x = 1");
        let json = builder.build().to_json().unwrap();
        assert!(json.contains("\"sourcesContent\""));
        assert!(json.contains("\"version\":3"));
    }

    #[test]
    fn test_source_map_comment() {
        let source_map = SourceMapBuilder::new().build();
        let comment = source_map.to_comment().unwrap();
        assert!(comment.starts_with("--# sourceMappingURL=data:application/json"));
        assert_eq!(
            SourceMap::url_comment("main.lua.map"),
            "--# sourceMappingURL=main.lua.map"
        );
    }
}
