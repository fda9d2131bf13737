use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::sse::{Event, KeepAlive, Sse},
    Json,
};
use chrono::{DateTime, Utc};
use futures::stream::{self, Stream};
use tracing::{debug, info, instrument};

use crate::countdown::{Countdown, TimeRemaining};
use crate::dtos::flash_sale::{CountdownResponse, CreateFlashSaleRequest, FlashSaleResponse};
use crate::error::AppError;
use crate::models::flash_sale::FlashSale;
use crate::pricing::flash_sales;
use crate::state::AppState;
use crate::store::Store;

fn to_response(store: &Store, sale: FlashSale, now: DateTime<Utc>) -> Result<FlashSaleResponse, AppError> {
    let product = store
        .product(sale.product_id)
        .ok_or_else(|| AppError::internal(format!("flash sale {} points at missing product", sale.id)))?;
    let status = flash_sales::status(&sale, now);
    let flash_price = flash_sales::flash_price(product.price, sale.discount_percentage).map_err(AppError::internal)?;

    Ok(FlashSaleResponse {
        id: sale.id,
        product_id: sale.product_id,
        product_name: product.name.clone(),
        original_price: product.price,
        flash_price,
        urgency: flash_sales::urgency(status.time_remaining_ms),
        time_remaining: flash_sales::format_time_remaining(status.time_remaining_ms),
        unavailable_reason: flash_sales::availability(&sale, product, now).err(),
        status,
        title: sale.title,
        description: sale.description,
        discount_percentage: sale.discount_percentage,
        start_time: sale.start_time,
        end_time: sale.end_time,
        max_quantity: sale.max_quantity,
        sold_quantity: sale.sold_quantity,
    })
}

async fn sale_end(state: &AppState, id: i64) -> Result<DateTime<Utc>, AppError> {
    let store = state.store.read().await;
    store
        .flash_sale(id)
        .map(|s| s.end_time)
        .ok_or_else(|| AppError::not_found("Flash sale not found"))
}

// GET /flash-sales
pub async fn list_flash_sales(State(state): State<AppState>) -> Result<Json<Vec<FlashSaleResponse>>, AppError> {
    let now = state.clock.now();
    let store = state.store.read().await;
    let sales = store
        .flash_sales()
        .into_iter()
        .map(|sale| to_response(&store, sale, now))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Json(sales))
}

// GET /flash-sales/{id}
pub async fn get_flash_sale(
    Path(id): Path<i64>,
    State(state): State<AppState>,
) -> Result<Json<FlashSaleResponse>, AppError> {
    let now = state.clock.now();
    let store = state.store.read().await;
    let sale = store.flash_sale(id).cloned().ok_or_else(|| AppError::not_found("Flash sale not found"))?;
    Ok(Json(to_response(&store, sale, now)?))
}

// POST /flash-sales
#[instrument(skip(state, payload), fields(product_id = payload.product_id))]
pub async fn create_flash_sale(
    State(state): State<AppState>,
    Json(payload): Json<CreateFlashSaleRequest>,
) -> Result<(StatusCode, Json<FlashSaleResponse>), AppError> {
    let now = state.clock.now();
    let errors = flash_sales::validate_new(
        &payload.title,
        payload.discount_percentage,
        payload.start_time,
        payload.end_time,
        payload.max_quantity,
        0,
        now,
    );
    if !errors.is_empty() {
        return Err(AppError::validation(errors.join("; ")));
    }

    let mut store = state.store.write().await;
    if store.product(payload.product_id).is_none() {
        return Err(AppError::not_found("Product not found"));
    }
    let id = store.next_id();
    let sale = store.insert_flash_sale(FlashSale {
        id,
        product_id: payload.product_id,
        title: payload.title.trim().to_string(),
        description: payload.description,
        discount_percentage: payload.discount_percentage,
        start_time: payload.start_time,
        end_time: payload.end_time,
        max_quantity: payload.max_quantity,
        sold_quantity: 0,
        is_active: true,
    });
    info!(id, "Flash sale created");

    Ok((StatusCode::CREATED, Json(to_response(&store, sale, now)?)))
}

// DELETE /flash-sales/{id}
pub async fn delete_flash_sale(
    Path(id): Path<i64>,
    State(state): State<AppState>,
) -> Result<StatusCode, AppError> {
    let mut store = state.store.write().await;
    store.remove_flash_sale(id).ok_or_else(|| AppError::not_found("Flash sale not found"))?;
    Ok(StatusCode::NO_CONTENT)
}

// GET /flash-sales/{id}/countdown
pub async fn get_countdown(
    Path(id): Path<i64>,
    State(state): State<AppState>,
) -> Result<Json<CountdownResponse>, AppError> {
    let end_time = sale_end(&state, id).await?;
    Ok(Json(CountdownResponse {
        flash_sale_id: id,
        end_time,
        remaining: TimeRemaining::between(end_time, state.clock.now()),
    }))
}

// GET /flash-sales/{id}/countdown/stream
// One `countdown` event per tick; the stream closes after the expired event.
// A disconnecting client drops the stream and with it the ticking task.
#[instrument(skip(state))]
pub async fn stream_countdown(
    Path(id): Path<i64>,
    State(state): State<AppState>,
) -> Result<Sse<impl Stream<Item = Result<Event, axum::Error>>>, AppError> {
    let end_time = sale_end(&state, id).await?;
    let countdown = Countdown::start(end_time, state.clock.clone());
    debug!(end = %countdown.end(), "Streaming countdown");

    let rx = countdown.subscribe();
    let first = countdown.current();
    let events = stream::unfold(Some((countdown, rx, Some(first))), |st| async move {
        let (countdown, mut rx, pending) = st?;
        let remaining = match pending {
            Some(remaining) => remaining,
            None => {
                rx.changed().await.ok()?;
                *rx.borrow_and_update()
            }
        };
        let event = Event::default().event("countdown").json_data(remaining);
        let next = (!remaining.is_expired).then_some((countdown, rx, None));
        Some((event, next))
    });

    Ok(Sse::new(events).keep_alive(KeepAlive::default()))
}
