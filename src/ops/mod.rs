pub mod budget_ops;
pub mod check;
pub mod goal_ops;
pub mod search;
pub mod task_ops;
