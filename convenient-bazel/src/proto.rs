//! Wire messages for `bazel query --output streamed_proto`
//!
//! Hand-annotated prost messages covering the stable subset of Bazel's
//! `blaze_query.Target` contract that this crate consumes. Fields not
//! declared here are skipped by prost during decoding, so newer bazel
//! releases that append fields keep decoding unchanged. Written out
//! instead of generated because no build-time protoc is needed for a
//! decode-only subset.

/// Which sub-message of [`Target`] is populated
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, ::prost::Enumeration)]
#[repr(i32)]
pub enum Discriminator {
    /// A build rule
    Rule = 1,
    /// A checked-in source file
    SourceFile = 2,
    /// A file produced by a rule
    GeneratedFile = 3,
    /// A package visibility group
    PackageGroup = 4,
    /// An environment group
    EnvironmentGroup = 5,
}

/// One node of the dependency graph as reported by `bazel query`
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Target {
    /// Discriminator mirroring the populated sub-message
    #[prost(enumeration = "Discriminator", tag = "1")]
    pub r#type: i32,
    /// Populated when the target is a rule
    #[prost(message, optional, tag = "2")]
    pub rule: Option<Rule>,
    /// Populated when the target is a source file
    #[prost(message, optional, tag = "3")]
    pub source_file: Option<SourceFile>,
    /// Populated when the target is a generated file
    #[prost(message, optional, tag = "4")]
    pub generated_file: Option<GeneratedFile>,
    /// Populated when the target is a package group
    #[prost(message, optional, tag = "5")]
    pub package_group: Option<PackageGroup>,
    /// Populated when the target is an environment group
    #[prost(message, optional, tag = "6")]
    pub environment_group: Option<EnvironmentGroup>,
}

/// A build rule and its declared attributes and edges
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Rule {
    /// Full label, e.g. `//lib:compute`
    #[prost(string, tag = "1")]
    pub name: String,
    /// Rule class, e.g. `cc_library`
    #[prost(string, tag = "2")]
    pub rule_class: String,
    /// BUILD-file location of the declaration
    #[prost(string, tag = "3")]
    pub location: String,
    /// Declared attributes
    #[prost(message, repeated, tag = "4")]
    pub attribute: Vec<Attribute>,
    /// Labels of all inputs (direct dependency edges)
    #[prost(string, repeated, tag = "5")]
    pub rule_input: Vec<String>,
    /// Labels of all outputs
    #[prost(string, repeated, tag = "6")]
    pub rule_output: Vec<String>,
}

/// A declared rule attribute (only the name is consumed here)
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Attribute {
    /// Attribute name, e.g. `srcs`
    #[prost(string, tag = "1")]
    pub name: String,
}

/// A leaf target tracked directly in version control
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct SourceFile {
    /// Full label, e.g. `//lib:compute.cc`
    #[prost(string, tag = "1")]
    pub name: String,
    /// BUILD-file location of the declaration
    #[prost(string, tag = "2")]
    pub location: String,
    /// Labels of files this file subincludes (load/include dependencies)
    #[prost(string, repeated, tag = "3")]
    pub subinclude: Vec<String>,
}

/// A file produced by a build rule
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct GeneratedFile {
    /// Full label of the file
    #[prost(string, tag = "1")]
    pub name: String,
    /// Label of the rule that generates this file
    #[prost(string, tag = "2")]
    pub generating_rule: String,
    /// BUILD-file location of the declaration
    #[prost(string, tag = "3")]
    pub location: String,
}

/// A package visibility group
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct PackageGroup {
    /// Full label of the group
    #[prost(string, tag = "1")]
    pub name: String,
    /// Packages contained in the group
    #[prost(string, repeated, tag = "2")]
    pub contained_package: Vec<String>,
    /// Labels of other package groups included by this one
    #[prost(string, repeated, tag = "3")]
    pub included_package_group: Vec<String>,
}

/// An environment group
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct EnvironmentGroup {
    /// Full label of the group
    #[prost(string, tag = "1")]
    pub name: String,
}
