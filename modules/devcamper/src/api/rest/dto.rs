use serde::{Deserialize, Serialize};

use crate::contract::model::{
    BootcampPatch, CoursePatch, Credentials, NewBootcamp, NewCourse, NewReview, NewUser,
    ReviewPatch, UserPatch,
};

/// REST DTO for creating a bootcamp. Missing fields are reported by
/// validation rather than by JSON decoding.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CreateBootcampReq {
    pub name: String,
    pub description: String,
    pub website: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub address: String,
    pub careers: Vec<String>,
    pub housing: bool,
    pub job_assistance: bool,
    pub job_guarantee: bool,
    pub accept_gi: bool,
}

/// REST DTO for updating a bootcamp (partial)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UpdateBootcampReq {
    pub name: Option<String>,
    pub description: Option<String>,
    pub website: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
    pub careers: Option<Vec<String>>,
    pub housing: Option<bool>,
    pub job_assistance: Option<bool>,
    pub job_guarantee: Option<bool>,
    pub accept_gi: Option<bool>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CreateCourseReq {
    pub title: String,
    pub description: String,
    pub weeks: String,
    pub tuition: Option<f64>,
    pub minimum_skill: String,
    pub scholarship_available: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UpdateCourseReq {
    pub title: Option<String>,
    pub description: Option<String>,
    pub weeks: Option<String>,
    pub tuition: Option<f64>,
    pub minimum_skill: Option<String>,
    pub scholarship_available: Option<bool>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CreateReviewReq {
    pub title: String,
    pub text: String,
    pub rating: Option<f64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct UpdateReviewReq {
    pub title: Option<String>,
    pub text: Option<String>,
    pub rating: Option<f64>,
}

/// Registration and admin user creation share one shape.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CreateUserReq {
    pub name: String,
    pub email: String,
    pub password: String,
    pub role: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct UpdateUserReq {
    pub name: Option<String>,
    pub email: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LoginReq {
    pub email: String,
    pub password: String,
}

/// `{ success, token }` returned by register and login.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenResponse {
    pub success: bool,
    pub token: String,
}

impl TokenResponse {
    pub fn new(token: String) -> Self {
        Self {
            success: true,
            token,
        }
    }
}

/// Unpaginated list body: `{ success, count, data }`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CollectionDto<T> {
    pub success: bool,
    pub count: usize,
    pub data: Vec<T>,
}

impl<T> CollectionDto<T> {
    pub fn new(data: Vec<T>) -> Self {
        Self {
            success: true,
            count: data.len(),
            data,
        }
    }
}

// Conversion implementations between REST DTOs and contract models

impl From<CreateBootcampReq> for NewBootcamp {
    fn from(req: CreateBootcampReq) -> Self {
        Self {
            name: req.name,
            description: req.description,
            website: req.website,
            phone: req.phone,
            email: req.email,
            address: req.address,
            careers: req.careers,
            housing: req.housing,
            job_assistance: req.job_assistance,
            job_guarantee: req.job_guarantee,
            accept_gi: req.accept_gi,
        }
    }
}

impl From<UpdateBootcampReq> for BootcampPatch {
    fn from(req: UpdateBootcampReq) -> Self {
        Self {
            name: req.name,
            description: req.description,
            website: req.website,
            phone: req.phone,
            email: req.email,
            address: req.address,
            careers: req.careers,
            housing: req.housing,
            job_assistance: req.job_assistance,
            job_guarantee: req.job_guarantee,
            accept_gi: req.accept_gi,
        }
    }
}

impl From<CreateCourseReq> for NewCourse {
    fn from(req: CreateCourseReq) -> Self {
        Self {
            title: req.title,
            description: req.description,
            weeks: req.weeks,
            tuition: req.tuition,
            minimum_skill: req.minimum_skill,
            scholarship_available: req.scholarship_available,
        }
    }
}

impl From<UpdateCourseReq> for CoursePatch {
    fn from(req: UpdateCourseReq) -> Self {
        Self {
            title: req.title,
            description: req.description,
            weeks: req.weeks,
            tuition: req.tuition,
            minimum_skill: req.minimum_skill,
            scholarship_available: req.scholarship_available,
        }
    }
}

impl From<CreateReviewReq> for NewReview {
    fn from(req: CreateReviewReq) -> Self {
        Self {
            title: req.title,
            text: req.text,
            rating: req.rating,
        }
    }
}

impl From<UpdateReviewReq> for ReviewPatch {
    fn from(req: UpdateReviewReq) -> Self {
        Self {
            title: req.title,
            text: req.text,
            rating: req.rating,
        }
    }
}

impl From<CreateUserReq> for NewUser {
    fn from(req: CreateUserReq) -> Self {
        Self {
            name: req.name,
            email: req.email,
            password: req.password,
            role: req.role,
        }
    }
}

impl From<UpdateUserReq> for UserPatch {
    fn from(req: UpdateUserReq) -> Self {
        Self {
            name: req.name,
            email: req.email,
        }
    }
}

impl From<LoginReq> for Credentials {
    fn from(req: LoginReq) -> Self {
        Self {
            email: req.email,
            password: req.password,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bootcamp_request_uses_camel_case() {
        let req: CreateBootcampReq = serde_json::from_value(serde_json::json!({
            "name": "Devworks",
            "jobAssistance": true,
            "acceptGi": true,
            "careers": ["Web Development"]
        }))
        .unwrap();
        let new: NewBootcamp = req.into();
        assert!(new.job_assistance);
        assert!(new.accept_gi);
        assert!(!new.housing);
        assert_eq!(new.address, "");
    }

    #[test]
    fn collection_counts_items() {
        let dto = CollectionDto::new(vec![1, 2, 3]);
        assert_eq!(
            serde_json::to_value(dto).unwrap(),
            serde_json::json!({"success": true, "count": 3, "data": [1, 2, 3]})
        );
    }
}
