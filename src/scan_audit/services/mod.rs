pub mod policy_evaluator;
pub mod report_assembler;
pub mod tag_selector;

pub use policy_evaluator::PolicyEvaluator;
pub use report_assembler::ReportAssembler;
pub use tag_selector::{ResolutionError, TagSelector};
