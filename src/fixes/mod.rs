//! Code fixes keyed by diagnostic id.
//!
//! | Provider | Diagnostics |
//! |---|---|
//! | [`RemoveDuplicateCaseLabel`] | CS0152 |
//! | [`SimplifyBooleanComparison`] | RCS1049 |
//! | [`ReplaceNullWithDefault`] | CS1503, CS0037 |
//! | [`ClsCompliance`] | CS3001, CS3002, CS3003, CS3008 |
//! | [`FixTupleElementName`] | CS8123 |
//! | [`RemoveUnusedVariable`] | CS0168, CS0219 |
//! | [`UseCompoundAssignmentFix`] | IDE0054 |

mod boolean_comparison;
mod cls_compliance;
mod compound_assignment;
mod duplicate_case_label;
mod null_to_default;
mod tuple_names;
mod unused_variable;

pub use boolean_comparison::SimplifyBooleanComparison;
pub use cls_compliance::ClsCompliance;
pub use compound_assignment::UseCompoundAssignmentFix;
pub use duplicate_case_label::RemoveDuplicateCaseLabel;
pub use null_to_default::ReplaceNullWithDefault;
pub use tuple_names::FixTupleElementName;
pub use unused_variable::RemoveUnusedVariable;

use crate::dispatch::CodeFixProvider;

/// Every code fix provider shipped by this crate.
pub fn builtin() -> Vec<Box<dyn CodeFixProvider>> {
    vec![
        Box::new(RemoveDuplicateCaseLabel),
        Box::new(SimplifyBooleanComparison),
        Box::new(ReplaceNullWithDefault),
        Box::new(ClsCompliance),
        Box::new(FixTupleElementName),
        Box::new(RemoveUnusedVariable),
        Box::new(UseCompoundAssignmentFix),
    ]
}
