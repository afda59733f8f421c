pub mod fields;
pub mod resume;

pub use fields::{FieldType, FilledField, PageState};
pub use resume::{
    Address, Certification, Education, Experience, PersonalInfo, Project, ResumeData, ResumeFile,
};
