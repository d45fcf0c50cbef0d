//! Translator Provider Chains
//!
//! Ordered, pluggable rule sets consulted by the translator once a member access
//! or method call has no structural translation of its own. Each rule inspects the
//! rewritten node (operands already translated) and either produces a relational
//! node or declines. The first rule that matches wins; if every rule declines the
//! subexpression is untranslatable.
//!
//! Hosts extend a chain with [`ProviderChain::register`] (append, runs after what
//! is already there) or [`ProviderChain::register_first`] (prepend, overrides it).
//! Plain closures implement both translator traits.

use crate::query_expr::{MemberInfo, MethodInfo};
use crate::sql_expr::SqlNode;
use crate::translator::Translated;

pub mod function_registry;
pub mod member_translators;
pub mod method_translators;

pub use member_translators::{DateTimeMemberTranslator, NullableHasValueTranslator, StringLengthTranslator};
pub use method_translators::{EqualsTranslator, FunctionRegistryTranslator, StringMethodTranslator};

/// Result of asking one rule to translate a node.
#[derive(Debug, Clone, PartialEq)]
pub enum ProviderOutcome {
    Matched(SqlNode),
    Declined,
}

/// A member access whose inner expression has been translated.
#[derive(Debug, Clone, PartialEq)]
pub struct RewrittenMember {
    pub inner: Option<Translated>,
    pub member: MemberInfo,
}

impl RewrittenMember {
    pub fn inner_sql(&self) -> Option<&SqlNode> {
        self.inner.as_ref().and_then(Translated::as_sql)
    }
}

/// A method call whose target and arguments have been translated, each independently.
/// An argument with no SQL equivalent stays in place as [`Translated::Untranslatable`].
#[derive(Debug, Clone, PartialEq)]
pub struct RewrittenCall {
    pub target: Option<Translated>,
    pub method: MethodInfo,
    pub arguments: Vec<Translated>,
}

impl RewrittenCall {
    pub fn target_sql(&self) -> Option<&SqlNode> {
        self.target.as_ref().and_then(Translated::as_sql)
    }

    pub fn argument_sql(&self, index: usize) -> Option<&SqlNode> {
        self.arguments.get(index).and_then(Translated::as_sql)
    }

    /// All arguments as SQL, or `None` if any argument is not an SQL node.
    pub fn arguments_sql(&self) -> Option<Vec<&SqlNode>> {
        self.arguments.iter().map(Translated::as_sql).collect()
    }
}

pub trait MemberTranslator: Send + Sync {
    fn translate(&self, member: &RewrittenMember) -> ProviderOutcome;

    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }
}

pub trait MethodCallTranslator: Send + Sync {
    fn translate(&self, call: &RewrittenCall) -> ProviderOutcome;

    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }
}

impl<F> MemberTranslator for F
where
    F: Fn(&RewrittenMember) -> ProviderOutcome + Send + Sync,
{
    fn translate(&self, member: &RewrittenMember) -> ProviderOutcome {
        self(member)
    }
}

impl<F> MethodCallTranslator for F
where
    F: Fn(&RewrittenCall) -> ProviderOutcome + Send + Sync,
{
    fn translate(&self, call: &RewrittenCall) -> ProviderOutcome {
        self(call)
    }
}

/// Ordered list of rules of one kind.
pub struct ProviderChain<T: ?Sized> {
    providers: Vec<Box<T>>,
}

impl<T: ?Sized> Default for ProviderChain<T> {
    fn default() -> Self {
        ProviderChain {
            providers: Vec::new(),
        }
    }
}

impl<T: ?Sized> ProviderChain<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a rule; it is consulted after every rule already registered.
    pub fn register(&mut self, provider: Box<T>) -> &mut Self {
        self.providers.push(provider);
        self
    }

    /// Prepend a rule; it is consulted before every rule already registered.
    pub fn register_first(&mut self, provider: Box<T>) -> &mut Self {
        self.providers.insert(0, provider);
        self
    }

    pub fn len(&self) -> usize {
        self.providers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }
}

impl ProviderChain<dyn MemberTranslator> {
    pub fn translate(&self, member: &RewrittenMember) -> ProviderOutcome {
        for provider in &self.providers {
            if let ProviderOutcome::Matched(node) = provider.translate(member) {
                log::trace!("member '{}' matched by {}", member.member.name, provider.name());
                return ProviderOutcome::Matched(node);
            }
        }
        ProviderOutcome::Declined
    }
}

impl ProviderChain<dyn MethodCallTranslator> {
    pub fn translate(&self, call: &RewrittenCall) -> ProviderOutcome {
        for provider in &self.providers {
            if let ProviderOutcome::Matched(node) = provider.translate(call) {
                log::trace!("method '{}' matched by {}", call.method.name, provider.name());
                return ProviderOutcome::Matched(node);
            }
        }
        ProviderOutcome::Declined
    }
}
