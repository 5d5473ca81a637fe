//! Typed view over decoded query records
//!
//! Each frame from the query stream is one [`proto::Target`] message;
//! [`Target`] is its typed form, with one variant per target kind.
//! Consumers match exhaustively instead of inspecting discriminators.

use crate::error::{QueryError, QueryResult};
use crate::proto;
use bytes::Bytes;
use prost::Message;

/// Kind of a decoded [`Target`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TargetKind {
    /// A build rule
    Rule,
    /// A checked-in source file
    SourceFile,
    /// A file produced by a rule
    GeneratedFile,
    /// A package visibility group
    PackageGroup,
    /// An environment group
    EnvironmentGroup,
}

/// A build rule node
#[derive(Debug, Clone, PartialEq)]
pub struct RuleTarget {
    /// Full label of the rule
    pub name: String,
    /// Rule class, e.g. `cc_library`
    pub rule_class: String,
    /// Names of the rule's declared attributes
    pub attributes: Vec<String>,
    /// Labels of all rule inputs (direct dependency edges)
    pub inputs: Vec<String>,
    /// Labels of all rule outputs
    pub outputs: Vec<String>,
}

/// A leaf source-file node
#[derive(Debug, Clone, PartialEq)]
pub struct SourceFileTarget {
    /// Full label of the file
    pub name: String,
    /// Subinclude labels in wire order; the order is part of the
    /// file's fingerprintable content
    pub subincludes: Vec<String>,
}

/// A file produced by a build rule
#[derive(Debug, Clone, PartialEq)]
pub struct GeneratedFileTarget {
    /// Full label of the file
    pub name: String,
    /// Label of the generating rule
    pub generating_rule: String,
}

/// A package visibility group node
#[derive(Debug, Clone, PartialEq)]
pub struct PackageGroupTarget {
    /// Full label of the group
    pub name: String,
    /// Packages contained in the group
    pub contained_packages: Vec<String>,
}

/// An environment group node
#[derive(Debug, Clone, PartialEq)]
pub struct EnvironmentGroupTarget {
    /// Full label of the group
    pub name: String,
}

/// One node of the dependency graph, decoded from a framed record
#[derive(Debug, Clone, PartialEq)]
pub enum Target {
    /// A build rule
    Rule(RuleTarget),
    /// A checked-in source file
    SourceFile(SourceFileTarget),
    /// A file produced by a rule
    GeneratedFile(GeneratedFileTarget),
    /// A package visibility group
    PackageGroup(PackageGroupTarget),
    /// An environment group
    EnvironmentGroup(EnvironmentGroupTarget),
}

impl Target {
    /// Decode one framed record into its typed form
    pub fn from_record(record: &Bytes) -> QueryResult<Self> {
        let wire = proto::Target::decode(record.as_ref())?;
        Self::from_wire(wire)
    }

    /// Select the variant from whichever sub-message is populated
    fn from_wire(wire: proto::Target) -> QueryResult<Self> {
        if let Some(rule) = wire.rule {
            return Ok(Self::Rule(RuleTarget {
                name: rule.name,
                rule_class: rule.rule_class,
                attributes: rule.attribute.into_iter().map(|a| a.name).collect(),
                inputs: rule.rule_input,
                outputs: rule.rule_output,
            }));
        }
        if let Some(source_file) = wire.source_file {
            return Ok(Self::SourceFile(SourceFileTarget {
                name: source_file.name,
                subincludes: source_file.subinclude,
            }));
        }
        if let Some(generated_file) = wire.generated_file {
            return Ok(Self::GeneratedFile(GeneratedFileTarget {
                name: generated_file.name,
                generating_rule: generated_file.generating_rule,
            }));
        }
        if let Some(package_group) = wire.package_group {
            return Ok(Self::PackageGroup(PackageGroupTarget {
                name: package_group.name,
                contained_packages: package_group.contained_package,
            }));
        }
        if let Some(environment_group) = wire.environment_group {
            return Ok(Self::EnvironmentGroup(EnvironmentGroupTarget {
                name: environment_group.name,
            }));
        }
        Err(QueryError::RecordDecode(
            "target record has no populated kind".to_string(),
        ))
    }

    /// Kind of this target
    pub fn kind(&self) -> TargetKind {
        match self {
            Self::Rule(_) => TargetKind::Rule,
            Self::SourceFile(_) => TargetKind::SourceFile,
            Self::GeneratedFile(_) => TargetKind::GeneratedFile,
            Self::PackageGroup(_) => TargetKind::PackageGroup,
            Self::EnvironmentGroup(_) => TargetKind::EnvironmentGroup,
        }
    }

    /// Full label of this target
    pub fn name(&self) -> &str {
        match self {
            Self::Rule(t) => &t.name,
            Self::SourceFile(t) => &t.name,
            Self::GeneratedFile(t) => &t.name,
            Self::PackageGroup(t) => &t.name,
            Self::EnvironmentGroup(t) => &t.name,
        }
    }

    /// The source-file view of this target, if it is one
    pub fn as_source_file(&self) -> Option<&SourceFileTarget> {
        match self {
            Self::SourceFile(t) => Some(t),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encode(wire: &proto::Target) -> Bytes {
        let mut buf = Vec::new();
        wire.encode(&mut buf).unwrap();
        Bytes::from(buf)
    }

    fn source_file_record(name: &str, subincludes: &[&str]) -> Bytes {
        encode(&proto::Target {
            r#type: proto::Discriminator::SourceFile as i32,
            source_file: Some(proto::SourceFile {
                name: name.to_string(),
                location: String::new(),
                subinclude: subincludes.iter().map(|s| s.to_string()).collect(),
            }),
            ..Default::default()
        })
    }

    #[test]
    fn decodes_source_file_with_subincludes_in_order() {
        let record = source_file_record("//lib:compute.cc", &["//tools:defs.bzl", "//lib:x.bzl"]);
        let target = Target::from_record(&record).unwrap();

        assert_eq!(target.kind(), TargetKind::SourceFile);
        assert_eq!(target.name(), "//lib:compute.cc");
        let source = target.as_source_file().unwrap();
        assert_eq!(source.subincludes, vec!["//tools:defs.bzl", "//lib:x.bzl"]);
    }

    #[test]
    fn decodes_rule_with_class_and_edges() {
        let record = encode(&proto::Target {
            r#type: proto::Discriminator::Rule as i32,
            rule: Some(proto::Rule {
                name: "//lib:compute".to_string(),
                rule_class: "cc_library".to_string(),
                location: "/workspace/lib/BUILD:3:1".to_string(),
                attribute: vec![proto::Attribute {
                    name: "srcs".to_string(),
                }],
                rule_input: vec!["//lib:compute.cc".to_string()],
                rule_output: vec![],
            }),
            ..Default::default()
        });

        match Target::from_record(&record).unwrap() {
            Target::Rule(rule) => {
                assert_eq!(rule.name, "//lib:compute");
                assert_eq!(rule.rule_class, "cc_library");
                assert_eq!(rule.attributes, vec!["srcs"]);
                assert_eq!(rule.inputs, vec!["//lib:compute.cc"]);
            }
            other => panic!("expected a rule, got {other:?}"),
        }
    }

    #[test]
    fn record_without_a_populated_kind_is_rejected() {
        let record = encode(&proto::Target::default());
        assert!(matches!(
            Target::from_record(&record),
            Err(QueryError::RecordDecode(_))
        ));
    }

    #[test]
    fn garbage_bytes_are_rejected() {
        // Field 1 declared as a length-delimited value that overruns the buffer.
        let record = Bytes::from_static(&[0x0a, 0xff, 0x01]);
        assert!(matches!(
            Target::from_record(&record),
            Err(QueryError::RecordDecode(_))
        ));
    }

    #[test]
    fn as_source_file_is_none_for_other_kinds() {
        let record = encode(&proto::Target {
            generated_file: Some(proto::GeneratedFile {
                name: "//lib:gen.h".to_string(),
                generating_rule: "//lib:gen".to_string(),
                location: String::new(),
            }),
            ..Default::default()
        });
        let target = Target::from_record(&record).unwrap();
        assert_eq!(target.kind(), TargetKind::GeneratedFile);
        assert!(target.as_source_file().is_none());
    }
}
