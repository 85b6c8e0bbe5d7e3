pub mod events;
pub mod optimizer;
pub mod template_ast;

pub use events::{EventHandler, EventMap, Handlers, gen_handlers};
pub use optimizer::{CompileOptions, optimize};
pub use template_ast::{AttrKind, ElementNode, IfBranch, Node, TemplateAttr};
