use chrono::NaiveDate;
use redis::{AsyncCommands, RedisResult};
use uuid::Uuid;

#[derive(Clone)]
pub struct RedisClient {
    client: redis::Client,
}

fn slot_key(unit_id: Uuid, date: NaiveDate, time: Option<&str>) -> String {
    format!("unit:{}:occupancy:{}:{}", unit_id, date, time.unwrap_or("day"))
}

impl RedisClient {
    pub async fn new(connection_string: &str) -> Result<Self, redis::RedisError> {
        let client = redis::Client::open(connection_string)?;
        Ok(Self { client })
    }

    // Occupancy cache: confirmed-count per (unit, date, time) slot, seeded
    // from SQL on miss and nudged on status transitions.

    pub async fn get_slot_occupancy(
        &self,
        unit_id: Uuid,
        date: NaiveDate,
        time: Option<&str>,
    ) -> RedisResult<Option<i64>> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        conn.get(slot_key(unit_id, date, time)).await
    }

    pub async fn set_slot_occupancy(
        &self,
        unit_id: Uuid,
        date: NaiveDate,
        time: Option<&str>,
        count: i64,
    ) -> RedisResult<()> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        conn.set(slot_key(unit_id, date, time), count).await
    }

    /// INCR only when the key already exists; a miss stays a miss until the
    /// next SQL seed, so we never invent counts from nothing.
    pub async fn incr_slot_occupancy(
        &self,
        unit_id: Uuid,
        date: NaiveDate,
        time: Option<&str>,
    ) -> RedisResult<Option<i64>> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        let script = redis::Script::new(
            r#"
            if redis.call("EXISTS", KEYS[1]) == 1 then
                return redis.call("INCR", KEYS[1])
            else
                return nil
            end
        "#,
        );

        script
            .key(slot_key(unit_id, date, time))
            .invoke_async(&mut conn)
            .await
    }

    pub async fn del_slot_occupancy(
        &self,
        unit_id: Uuid,
        date: NaiveDate,
        time: Option<&str>,
    ) -> RedisResult<()> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        conn.del(slot_key(unit_id, date, time)).await
    }

    // Refresh token store, one opaque token per user.

    pub async fn store_refresh_token(
        &self,
        user_id: Uuid,
        token: &str,
        ttl_seconds: u64,
    ) -> RedisResult<()> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        let key = format!("auth:refresh:{}", user_id);
        conn.set_ex::<_, _, ()>(key, token, ttl_seconds).await?;
        Ok(())
    }

    pub async fn get_refresh_token(&self, user_id: Uuid) -> RedisResult<Option<String>> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        let key = format!("auth:refresh:{}", user_id);
        conn.get(key).await
    }

    pub async fn delete_refresh_token(&self, user_id: Uuid) -> RedisResult<()> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        let key = format!("auth:refresh:{}", user_id);
        conn.del(key).await
    }

    pub async fn check_rate_limit(
        &self,
        key: &str,
        limit: i64,
        window_seconds: i64,
    ) -> RedisResult<bool> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;

        let (count,): (i64,) = redis::pipe()
            .atomic()
            .incr(key, 1)
            .expire(key, window_seconds)
            .ignore()
            .query_async(&mut conn)
            .await?;

        Ok(count <= limit)
    }
}
