// Prompt constants for the Recommendation service.

use crate::catalog::Catalog;
use crate::recommendation::schema::{SchemaFields, SchemaVariant};
use crate::recommendation::{RecommendationQuery, MAX_RECOMMENDATIONS};

/// Recommendation prompt template.
/// Placeholders: {query}, {max}, {catalog}, {example}, {field_list}.
pub const RECOMMEND_PROMPT_TEMPLATE: &str = r#"You are an expert assistant helping recruiters choose SHL assessments for this job description:
"""
{query}
"""

Pick up to {max} assessments from this catalog (one assessment per line, columns separated by " | "):
{catalog}

Return ONLY a JSON array of at most {max} objects, most relevant first, like this:
{example}

RULES:
1. Each object must have exactly these keys: {field_list}
2. Only recommend assessments that appear in the catalog above, and copy their URL exactly
3. Support fields are "Yes" or "No"; duration is a whole number of minutes; the type field is an array of strings
4. Do NOT include any text outside the JSON array
5. Do NOT use markdown code fences"#;

/// Renders the full prompt for one query. The query and catalog are embedded verbatim.
pub fn render_prompt(
    query: &RecommendationQuery,
    catalog: &Catalog,
    schema: SchemaVariant,
) -> String {
    let fields = schema.fields();
    let max = MAX_RECOMMENDATIONS.to_string();
    let catalog = catalog.render_for_prompt();
    let example = example_reply(fields);
    let field_list = field_list(fields);

    fill_template(RECOMMEND_PROMPT_TEMPLATE, |name| match name {
        "query" => Some(query.text()),
        "max" => Some(max.as_str()),
        "catalog" => Some(catalog.as_str()),
        "example" => Some(example.as_str()),
        "field_list" => Some(field_list.as_str()),
        _ => None,
    })
}

/// Substitutes `{name}` tokens in a single left-to-right pass.
///
/// Only the template is scanned: inserted values are copied as-is, so braces
/// inside a query or catalog cell never act as placeholders. Unknown tokens
/// are kept literally.
fn fill_template<'a>(template: &str, lookup: impl Fn(&str) -> Option<&'a str>) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        let value = after
            .find('}')
            .and_then(|close| lookup(&after[..close]).map(|value| (close, value)));
        match value {
            Some((close, value)) => {
                out.push_str(value);
                rest = &after[close + 1..];
            }
            None => {
                out.push('{');
                rest = after;
            }
        }
    }
    out.push_str(rest);
    out
}

fn ordered_keys(fields: &SchemaFields) -> Vec<&'static str> {
    let mut keys = Vec::with_capacity(7);
    if let Some(name) = fields.name {
        keys.push(name);
    }
    keys.extend([
        fields.url,
        fields.adaptive_support,
        fields.description,
        fields.duration,
        fields.remote_support,
        fields.test_type,
    ]);
    keys
}

fn field_list(fields: &SchemaFields) -> String {
    ordered_keys(fields)
        .iter()
        .map(|k| quote(k))
        .collect::<Vec<_>>()
        .join(", ")
}

/// One example object, keys in prompt order.
fn example_reply(fields: &SchemaFields) -> String {
    let mut lines = Vec::new();
    if let Some(name) = fields.name {
        lines.push(format!("    {}: \"Assessment name\"", quote(name)));
    }
    lines.push(format!("    {}: \"https://...\"", quote(fields.url)));
    lines.push(format!("    {}: \"Yes\"", quote(fields.adaptive_support)));
    lines.push(format!(
        "    {}: \"Test description\"",
        quote(fields.description)
    ));
    lines.push(format!("    {}: 45", quote(fields.duration)));
    lines.push(format!("    {}: \"Yes\"", quote(fields.remote_support)));
    lines.push(format!(
        "    {}: [\"Technical\", \"Behavioral\"]",
        quote(fields.test_type)
    ));
    format!("[\n  {{\n{}\n  }}\n]", lines.join(",\n"))
}

fn quote(key: &str) -> String {
    serde_json::Value::from(key).to_string()
}
