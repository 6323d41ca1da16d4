//! Static conformance of submission source.
//!
//! The source is parsed with `syn` and walked with `syn::visit`; nothing is
//! compiled or executed. A function is found as a free `fn`, an `impl`
//! method, or inside an inline module, first match wins.
//!
//! Parameter lists are compared as token text with all whitespace removed,
//! so names, order, and types must match verbatim. A `self` receiver is
//! ignored.
//!
//! Macro bodies are opaque token streams to `syn`. The walker re-parses
//! them as a comma-separated expression list or as a statement list so a
//! loop cannot hide inside `vec![...]` or a user macro; bodies that parse as
//! neither are skipped.

use std::collections::BTreeMap;

use quote::ToTokens;
use serde::Serialize;
use syn::punctuated::Punctuated;
use syn::visit::{self, Visit};
use syn::{Block, Expr, FnArg, GenericArgument, PathArguments, ReturnType, Signature, Type};
use tracing::debug;

use crate::failure::{Failure, StructuralViolation};

#[derive(Debug, thiserror::Error)]
pub enum ConformanceError {
    #[error("submission source does not parse as Rust: {0}")]
    Parse(#[from] syn::Error),
}

/// What a submitted function must look like.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionContract {
    pub name: String,
    pub params: String,
    pub no_loops: bool,
    pub no_return: bool,
    pub returns_pyramid_pair: bool,
}

impl FunctionContract {
    pub fn new(name: impl Into<String>, params: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            params: params.into(),
            no_loops: false,
            no_return: false,
            returns_pyramid_pair: false,
        }
    }

    pub fn no_loops(mut self) -> Self {
        self.no_loops = true;
        self
    }

    pub fn no_return(mut self) -> Self {
        self.no_return = true;
        self
    }

    pub fn returns_pyramid_pair(mut self) -> Self {
        self.returns_pyramid_pair = true;
        self
    }
}

/// Structural facts about one submitted function.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConformanceReport {
    pub function: String,
    pub found: bool,
    pub params: String,
    pub signature_matches: bool,
    pub uses_loop: bool,
    pub loop_construct: Option<&'static str>,
    pub has_return: bool,
    pub return_type: String,
    pub returns_pyramid_pair: bool,
}

impl ConformanceReport {
    fn missing(function: &str) -> Self {
        Self {
            function: function.to_owned(),
            found: false,
            params: String::new(),
            signature_matches: false,
            uses_loop: false,
            loop_construct: None,
            has_return: false,
            return_type: String::new(),
            returns_pyramid_pair: false,
        }
    }

    /// First violated constraint of `contract`, checked in the order
    /// presence, signature, loops, return, return shape.
    pub fn verdict(&self, contract: &FunctionContract) -> Result<(), Failure> {
        let violation = if !self.found {
            Some(StructuralViolation::Missing)
        } else if !self.signature_matches {
            Some(StructuralViolation::Signature {
                expected: contract.params.clone(),
                actual: self.params.clone(),
            })
        } else if contract.no_loops && self.uses_loop {
            Some(StructuralViolation::Loop {
                construct: self.loop_construct.unwrap_or("loop"),
            })
        } else if contract.no_return && self.has_return {
            Some(StructuralViolation::Return)
        } else if contract.returns_pyramid_pair && !self.returns_pyramid_pair {
            Some(StructuralViolation::ReturnShape {
                actual: self.return_type.clone(),
            })
        } else {
            None
        };

        match violation {
            None => Ok(()),
            Some(violation) => Err(Failure::Structural {
                function: contract.name.clone(),
                violation,
            }),
        }
    }
}

/// Parsed submission source.
pub struct ConformanceChecker {
    file: syn::File,
}

impl ConformanceChecker {
    pub fn parse(source: &str) -> Result<Self, ConformanceError> {
        Ok(Self {
            file: syn::parse_file(source)?,
        })
    }

    /// Inspects `contract.name` and compares it against `contract.params`.
    pub fn inspect(&self, contract: &FunctionContract) -> ConformanceReport {
        let mut finder = FnFinder {
            name: &contract.name,
            found: None,
        };
        finder.visit_file(&self.file);

        let Some((sig, block)) = finder.found else {
            debug!(function = %contract.name, "function not found in submission source");
            return ConformanceReport::missing(&contract.name);
        };

        let params = param_list(sig);
        let signature_matches = strip_whitespace(&params) == strip_whitespace(&contract.params);

        let mut scan = ForbiddenConstructs::default();
        scan.visit_block(block);

        let return_type = match &sig.output {
            ReturnType::Default => "()".to_owned(),
            ReturnType::Type(_, ty) => ty.to_token_stream().to_string(),
        };

        let report = ConformanceReport {
            function: contract.name.clone(),
            found: true,
            params,
            signature_matches,
            uses_loop: scan.loop_construct.is_some(),
            loop_construct: scan.loop_construct,
            has_return: scan.has_return,
            return_type,
            returns_pyramid_pair: returns_pyramid_pair(&sig.output),
        };
        debug!(
            function = %report.function,
            signature_matches = report.signature_matches,
            uses_loop = report.uses_loop,
            has_return = report.has_return,
            "inspected submission function"
        );
        report
    }

    pub fn check(&self, contract: &FunctionContract) -> Result<ConformanceReport, Failure> {
        let report = self.inspect(contract);
        report.verdict(contract)?;
        Ok(report)
    }
}

/// Reports for every contract, derived once per run.
///
/// Submission source does not change during a run, so each function is
/// inspected exactly once at suite setup.
#[derive(Debug, Clone, Default)]
pub struct ConformanceCache {
    entries: BTreeMap<String, (FunctionContract, ConformanceReport)>,
}

impl ConformanceCache {
    pub fn build(source: &str, contracts: &[FunctionContract]) -> Result<Self, ConformanceError> {
        let checker = ConformanceChecker::parse(source)?;
        let entries = contracts
            .iter()
            .map(|c| (c.name.clone(), (c.clone(), checker.inspect(c))))
            .collect();
        Ok(Self { entries })
    }

    pub fn report(&self, function: &str) -> Option<&ConformanceReport> {
        self.entries.get(function).map(|(_, report)| report)
    }

    /// Verdict for `function`; a function without a registered contract is
    /// reported as missing.
    pub fn verdict(&self, function: &str) -> Result<(), Failure> {
        match self.entries.get(function) {
            Some((contract, report)) => report.verdict(contract),
            None => Err(Failure::Structural {
                function: function.to_owned(),
                violation: StructuralViolation::Missing,
            }),
        }
    }

    pub fn reports(&self) -> impl Iterator<Item = &ConformanceReport> {
        self.entries.values().map(|(_, report)| report)
    }
}

struct FnFinder<'n, 'ast> {
    name: &'n str,
    found: Option<(&'ast Signature, &'ast Block)>,
}

impl<'ast> Visit<'ast> for FnFinder<'_, 'ast> {
    fn visit_item_fn(&mut self, node: &'ast syn::ItemFn) {
        if self.found.is_none() && node.sig.ident == self.name {
            self.found = Some((&node.sig, &node.block));
            return;
        }
        visit::visit_item_fn(self, node);
    }

    fn visit_impl_item_fn(&mut self, node: &'ast syn::ImplItemFn) {
        if self.found.is_none() && node.sig.ident == self.name {
            self.found = Some((&node.sig, &node.block));
            return;
        }
        visit::visit_impl_item_fn(self, node);
    }
}

#[derive(Default)]
struct ForbiddenConstructs {
    loop_construct: Option<&'static str>,
    has_return: bool,
}

impl ForbiddenConstructs {
    fn record_loop(&mut self, construct: &'static str) {
        self.loop_construct.get_or_insert(construct);
    }
}

impl<'ast> Visit<'ast> for ForbiddenConstructs {
    fn visit_expr_for_loop(&mut self, node: &'ast syn::ExprForLoop) {
        self.record_loop("for");
        visit::visit_expr_for_loop(self, node);
    }

    fn visit_expr_while(&mut self, node: &'ast syn::ExprWhile) {
        self.record_loop("while");
        visit::visit_expr_while(self, node);
    }

    fn visit_expr_loop(&mut self, node: &'ast syn::ExprLoop) {
        self.record_loop("loop");
        visit::visit_expr_loop(self, node);
    }

    fn visit_expr_return(&mut self, node: &'ast syn::ExprReturn) {
        self.has_return = true;
        visit::visit_expr_return(self, node);
    }

    fn visit_macro(&mut self, node: &'ast syn::Macro) {
        if let Ok(exprs) = node.parse_body_with(Punctuated::<Expr, syn::Token![,]>::parse_terminated)
        {
            for expr in &exprs {
                self.visit_expr(expr);
            }
        } else if let Ok(stmts) = node.parse_body_with(Block::parse_within) {
            for stmt in &stmts {
                self.visit_stmt(stmt);
            }
        }
        visit::visit_macro(self, node);
    }
}

fn param_list(sig: &Signature) -> String {
    sig.inputs
        .iter()
        .filter_map(|arg| match arg {
            FnArg::Receiver(_) => None,
            FnArg::Typed(pat) => Some(pat.to_token_stream().to_string()),
        })
        .collect::<Vec<_>>()
        .join(", ")
}

fn strip_whitespace(s: &str) -> String {
    s.chars().filter(|c| !c.is_whitespace()).collect()
}

/// `(Vec<_>, _)`, optionally wrapped in a `Result<_, _>`.
fn returns_pyramid_pair(output: &ReturnType) -> bool {
    let ReturnType::Type(_, ty) = output else {
        return false;
    };
    let ty = unwrap_result(ty).unwrap_or(ty);

    match ty {
        Type::Tuple(tuple) if tuple.elems.len() == 2 => {
            matches!(&tuple.elems[0], Type::Path(p) if last_ident_is(p, "Vec"))
        }
        Type::Paren(inner) => returns_pyramid_pair(&ReturnType::Type(
            Default::default(),
            inner.elem.clone(),
        )),
        _ => false,
    }
}

fn unwrap_result(ty: &Type) -> Option<&Type> {
    let Type::Path(path) = ty else {
        return None;
    };
    let segment = path.path.segments.last()?;
    if segment.ident != "Result" {
        return None;
    }
    let PathArguments::AngleBracketed(args) = &segment.arguments else {
        return None;
    };
    args.args.iter().find_map(|arg| match arg {
        GenericArgument::Type(inner) => Some(inner),
        _ => None,
    })
}

fn last_ident_is(path: &syn::TypePath, ident: &str) -> bool {
    path.path
        .segments
        .last()
        .is_some_and(|segment| segment.ident == ident)
}
