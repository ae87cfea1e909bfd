pub use projex_models::{
    CreateProjectDto, PaginatedProjectsResponse, Project, ProjectDeletionSummary, ProjectRole,
    ProjectWithRole, UpdateProjectDto,
};
