//! One builder per diet.
//!
//! Every builder starts from the profile-level base (allergies, dislikes,
//! variety, calorie and prep-time targets) and layers the diet's own bans,
//! category requirements, protein floors and structure rules on top.

mod balanced;
mod keto;
mod mediterranean;
mod vegan;
mod wahls;

pub use balanced::balanced_rule_set;
pub use keto::{keto_rule_set, KETO_MAX_NET_CARBS_G};
pub use mediterranean::mediterranean_rule_set;
pub use vegan::vegan_rule_set;
pub use wahls::wahls_paleo_plus_rule_set;
