use crate::error::{Error, Result};
use crate::models::Classification;

pub fn parse_classification(response: &str) -> Result<Classification> {
    let json_str = extract_json(response)?;

    let value: serde_json::Value = serde_json::from_str(&json_str)
        .map_err(|e| Error::ParseError(format!("Failed to parse LLM response: {}", e)))?;

    Classification::from_value(value)
}

fn extract_json(text: &str) -> Result<String> {
    // Fenced ```json block
    if let Some(start) = text.find("```json") {
        let start = start + 7;
        if let Some(end) = text[start..].find("```") {
            return Ok(text[start..start + end].trim().to_string());
        }
    }

    // First balanced object
    if let Some(start) = text.find('{') {
        let mut depth = 0;
        let mut end = start;
        let mut in_string = false;
        let mut escape_next = false;

        for (i, c) in text[start..].char_indices() {
            if escape_next {
                escape_next = false;
                continue;
            }

            match c {
                '\\' if in_string => escape_next = true,
                '"' => in_string = !in_string,
                '{' if !in_string => depth += 1,
                '}' if !in_string => {
                    depth -= 1;
                    if depth == 0 {
                        end = start + i + 1;
                        break;
                    }
                }
                _ => {}
            }
        }

        if depth == 0 && end > start {
            return Ok(text[start..end].to_string());
        }
    }

    Err(Error::ParseError("No valid JSON found in response".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_json_from_markdown() {
        let input = r#"Here you go:
```json
{"isAiRelated": true, "hypeMeter": 8, "tags": ["llm"]}
```
"#;
        let result = parse_classification(input).unwrap();
        assert!(result.is_ai_related);
        assert_eq!(result.hype_meter, 8);
    }

    #[test]
    fn test_extract_raw_json() {
        let input = r#"Result: {"isAiRelated": false, "hypeMeter": 2, "tags": ["a {b}"]} done"#;
        let result = parse_classification(input).unwrap();
        assert_eq!(result.tags, vec!["a {b}".to_string()]);
    }

    #[test]
    fn test_no_json() {
        assert!(matches!(
            parse_classification("I cannot classify this."),
            Err(Error::ParseError(_))
        ));
    }

    #[test]
    fn test_out_of_shape_rejected() {
        let input = r#"{"isAiRelated": false, "hypeMeter": 12, "tags": []}"#;
        assert!(matches!(
            parse_classification(input),
            Err(Error::InvalidClassification(_))
        ));
    }
}
