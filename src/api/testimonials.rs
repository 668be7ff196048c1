// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    Json,
};

use crate::{
    auth::Auth,
    error::ApiError,
    models::CreateTestimonialRequest,
    state::AppState,
    storage::{NewTestimonial, TestimonialRecord},
};

#[utoipa::path(
    get,
    path = "/api/testimonials",
    tag = "Testimonials",
    responses((status = 200, body = [TestimonialRecord]))
)]
pub async fn list_testimonials(
    State(state): State<AppState>,
) -> Result<Json<Vec<TestimonialRecord>>, ApiError> {
    Ok(Json(state.store.list_testimonials()?))
}

#[utoipa::path(
    post,
    path = "/api/testimonials",
    request_body = CreateTestimonialRequest,
    tag = "Testimonials",
    security(("bearer" = [])),
    responses(
        (status = 201, body = TestimonialRecord),
        (status = 400, description = "Empty name or review, or rating outside 1-5"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "CSRF token missing or mismatched")
    )
)]
pub async fn create_testimonial(
    Auth(user): Auth,
    State(state): State<AppState>,
    payload: Result<Json<CreateTestimonialRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<TestimonialRecord>), ApiError> {
    let Json(request) = payload?;
    let name = request.name.trim();
    let review = request.review.trim();
    if name.is_empty() || review.is_empty() {
        return Err(ApiError::bad_request("Name and review are required"));
    }
    let rating = u8::try_from(request.rating)
        .ok()
        .filter(|r| (1..=5).contains(r))
        .ok_or_else(|| ApiError::bad_request("Rating must be between 1 and 5"))?;

    let testimonial = state.store.create_testimonial(NewTestimonial {
        name: name.to_string(),
        review: review.to_string(),
        rating,
    })?;
    tracing::info!(user_id = user.user_id, testimonial_id = testimonial.id, "Testimonial created");
    Ok((StatusCode::CREATED, Json(testimonial)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::AuthenticatedUser;
    use crate::test_support::test_state;

    fn caller() -> Auth {
        Auth(AuthenticatedUser {
            user_id: 1,
            csrf_token: Some("nonce".to_string()),
            expires_at: 0,
        })
    }

    fn request(rating: i64) -> CreateTestimonialRequest {
        CreateTestimonialRequest {
            name: "Rina".to_string(),
            review: "Fresh and on time.".to_string(),
            rating,
        }
    }

    #[tokio::test]
    async fn create_then_list() {
        let (state, _dir) = test_state();
        let (status, Json(created)) =
            create_testimonial(caller(), State(state.clone()), Ok(Json(request(5))))
                .await
                .unwrap();
        assert_eq!(status, StatusCode::CREATED);

        let Json(list) = list_testimonials(State(state)).await.unwrap();
        assert_eq!(list.len(), 1);
        assert_eq!(list[0].id, created.id);
        assert_eq!(list[0].rating, 5);
    }

    #[tokio::test]
    async fn rating_must_be_one_to_five() {
        let (state, _dir) = test_state();
        for rating in [0, 6, -1, 300] {
            let body = Ok(Json(request(rating)));
            let err = create_testimonial(caller(), State(state.clone()), body).await.unwrap_err();
            assert_eq!(err.status, StatusCode::BAD_REQUEST, "{rating}");
        }
    }

    #[tokio::test]
    async fn blank_review_is_rejected() {
        let (state, _dir) = test_state();
        let bad = CreateTestimonialRequest {
            review: "  ".to_string(),
            ..request(4)
        };
        let err = create_testimonial(caller(), State(state), Ok(Json(bad))).await.unwrap_err();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
    }
}
