pub use projex_models::{AddMemberDto, MemberWithUser, ProjectRole, UpdateMemberRoleDto};
