use crate::config::SynthesisConfig;
use crate::core::infer::EventGroup;
use crate::core::schema::{ObjectShape, SchemaNode};
use crate::render::ident::{
    is_identifier, member_access, property_key, quote, type_name_for, NameAllocator,
};

const INDENT: &str = "  ";

/// Renders inferred event groups as a TypeScript discriminated union plus a
/// dispatch function.
///
/// Output depends only on the groups and the configuration, so rendering the
/// same groups twice yields identical text.
#[derive(Debug, Clone)]
pub struct CodeSynthesizer {
    discriminant_path: Vec<String>,
    union_name: String,
    dispatch_name: String,
}

/// A group paired with the names it renders under.
struct NamedGroup<'a> {
    group: &'a EventGroup,
    type_name: String,
    handler_name: String,
}

impl CodeSynthesizer {
    #[must_use]
    pub fn new(config: &SynthesisConfig) -> Self {
        Self {
            discriminant_path: config.discriminant_segments(),
            union_name: config.union_name.clone(),
            dispatch_name: config.dispatch_name.clone(),
        }
    }

    #[must_use]
    pub fn render(&self, groups: &[EventGroup]) -> String {
        let named = self.assign_names(groups);
        let mut out = String::new();

        let sample_count: usize = groups.iter().map(|group| group.sample_ids.len()).sum();
        out.push_str(&format!(
            "// Generated by hook_synth from {sample_count} captured sample(s) across {} event kind(s).\n",
            groups.len()
        ));
        out.push_str(&format!(
            "// Discriminant field: {}\n\n",
            self.discriminant_path.join(".")
        ));

        for entry in &named {
            out.push_str(&format!("export interface {} ", entry.type_name));
            out.push_str(&self.render_object(
                &entry.group.shape,
                0,
                Some(self.discriminant_path.as_slice()),
                &entry.group.discriminant,
            ));
            out.push_str("\n\n");
        }

        self.render_union(&mut out, &named);
        for entry in &named {
            out.push_str(&format!(
                "export function {}(event: {}): void {{\n",
                entry.handler_name, entry.type_name
            ));
            out.push_str(&format!(
                "{INDENT}console.log({}, event);\n}}\n\n",
                quote(&entry.group.discriminant)
            ));
        }
        self.render_dispatch(&mut out, &named);

        out
    }

    fn assign_names<'a>(&self, groups: &'a [EventGroup]) -> Vec<NamedGroup<'a>> {
        let mut names = NameAllocator::new();
        names.reserve(self.union_name.clone());
        names.reserve(self.dispatch_name.clone());
        if let Some(rest) = self.dispatch_name.strip_prefix("handle") {
            names.reserve(rest);
        }

        groups
            .iter()
            .map(|group| {
                let type_name = names.allocate(&type_name_for(&group.discriminant));
                NamedGroup {
                    group,
                    handler_name: format!("handle{type_name}"),
                    type_name,
                }
            })
            .collect()
    }

    fn render_union(&self, out: &mut String, named: &[NamedGroup<'_>]) {
        match named {
            [] => out.push_str(&format!("export type {} = never;\n\n", self.union_name)),
            [only] => out.push_str(&format!(
                "export type {} = {};\n\n",
                self.union_name, only.type_name
            )),
            _ => {
                out.push_str(&format!("export type {} =\n", self.union_name));
                for (index, entry) in named.iter().enumerate() {
                    let terminator = if index + 1 == named.len() { ";" } else { "" };
                    out.push_str(&format!("{INDENT}| {}{terminator}\n", entry.type_name));
                }
                out.push('\n');
            }
        }
    }

    fn render_dispatch(&self, out: &mut String, named: &[NamedGroup<'_>]) {
        out.push_str(&format!(
            "export function {}(event: {}): void {{\n",
            self.dispatch_name, self.union_name
        ));

        if named.is_empty() {
            out.push_str(&format!(
                "{INDENT}console.warn(\"Unhandled webhook event\", event);\n}}\n"
            ));
            return;
        }

        // Only a top-level, identifier-named discriminant narrows the union in a switch.
        let narrows = matches!(self.discriminant_path.as_slice(), [field] if is_identifier(field));
        let pad2 = INDENT.repeat(2);
        let pad3 = INDENT.repeat(3);

        out.push_str(&format!(
            "{INDENT}switch ({}) {{\n",
            member_access("event", &self.discriminant_path)
        ));
        for entry in named {
            out.push_str(&format!(
                "{pad2}case {}:\n",
                quote(&entry.group.discriminant)
            ));
            if narrows {
                out.push_str(&format!("{pad3}{}(event);\n", entry.handler_name));
            } else {
                out.push_str(&format!(
                    "{pad3}{}(event as {});\n",
                    entry.handler_name, entry.type_name
                ));
            }
            out.push_str(&format!("{pad3}break;\n"));
        }

        out.push_str(&format!("{pad2}default: {{\n"));
        if narrows {
            out.push_str(&format!("{pad3}const unhandled: never = event;\n"));
            out.push_str(&format!(
                "{pad3}console.warn(\"Unhandled webhook event\", unhandled);\n"
            ));
        } else {
            out.push_str(&format!(
                "{pad3}console.warn(\"Unhandled webhook event\", event);\n"
            ));
        }
        out.push_str(&format!("{pad2}}}\n{INDENT}}}\n}}\n"));
    }

    /// `discriminant_rest` is the part of the discriminant path below this
    /// object; the field it ends on is pinned to the group's literal.
    fn render_object(
        &self,
        shape: &ObjectShape,
        depth: usize,
        discriminant_rest: Option<&[String]>,
        discriminant: &str,
    ) -> String {
        if shape.is_empty() {
            return "Record<string, unknown>".to_string();
        }

        let pad = INDENT.repeat(depth + 1);
        let mut out = String::from("{\n");
        for field in shape.fields() {
            let rest = discriminant_rest.and_then(|rest| match rest.split_first() {
                Some((head, tail)) if *head == field.name => Some(tail),
                _ => None,
            });
            let rendered = match (rest, &field.node) {
                (Some([]), _) => quote(discriminant),
                (Some(tail), SchemaNode::Object(inner)) => {
                    self.render_object(inner, depth + 1, Some(tail), discriminant)
                }
                _ => self.render_node(&field.node, depth + 1),
            };
            let marker = if field.optional { "?" } else { "" };
            out.push_str(&format!(
                "{pad}{}{marker}: {rendered};\n",
                property_key(&field.name)
            ));
        }
        out.push_str(&INDENT.repeat(depth));
        out.push('}');
        out
    }

    fn render_node(&self, node: &SchemaNode, depth: usize) -> String {
        match node {
            SchemaNode::Primitive(kind) => kind.as_str().to_string(),
            SchemaNode::LiteralUnion(values) if values.is_empty() => "never".to_string(),
            SchemaNode::LiteralUnion(values) => values
                .iter()
                .map(|value| quote(value))
                .collect::<Vec<_>>()
                .join(" | "),
            SchemaNode::Object(shape) => self.render_object(shape, depth, None, ""),
            SchemaNode::Array(element) => {
                let inner = self.render_node(element, depth);
                let needs_parens = match element.as_ref() {
                    SchemaNode::Union(members) => members.len() > 1,
                    SchemaNode::LiteralUnion(values) => values.len() > 1,
                    _ => false,
                };
                if needs_parens {
                    format!("({inner})[]")
                } else {
                    format!("{inner}[]")
                }
            }
            SchemaNode::Union(members) if members.is_empty() => "never".to_string(),
            SchemaNode::Union(members) => members
                .iter()
                .map(|member| self.render_node(member, depth))
                .collect::<Vec<_>>()
                .join(" | "),
            SchemaNode::Unknown => "unknown".to_string(),
        }
    }
}
