//! Background maintenance workers

use chrono::Utc;

use crate::infrastructure::persistence::SqliteRepository;

/// Remove every spell effect past its due timestamp. Returns the number
/// of effects purged.
pub async fn sweep_expired_spells(repository: &SqliteRepository) -> anyhow::Result<u64> {
    repository.magic().purge_expired(Utc::now()).await
}

/// Periodic spell-expiry sweep. Effects past `due` stop existing as far
/// as modifier lookups are concerned only once this loop removes them,
/// so the interval bounds how long a stale effect can linger.
pub async fn spell_expiry_worker(repository: SqliteRepository, interval_secs: u64) {
    loop {
        match sweep_expired_spells(&repository).await {
            Ok(0) => {}
            Ok(purged) => tracing::debug!("Purged {} expired spell effects", purged),
            Err(e) => tracing::error!("Spell expiry sweep failed: {}", e),
        }
        tokio::time::sleep(std::time::Duration::from_secs(interval_secs)).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::{Account, Player, Spell, SpellDue, SpellHolding};
    use crate::domain::value_objects::{DueId, HoldingId};

    #[tokio::test]
    async fn sweep_removes_only_past_due_effects() {
        let repository = SqliteRepository::in_memory().await.unwrap();

        let account = Account::new("ada");
        repository.accounts().create(&account).await.unwrap();
        let player = Player::new(account.id);
        repository.players().create(&player).await.unwrap();

        let stale = Spell::new("curse", "Curse");
        let fresh = Spell::new("haze", "Haze");
        repository.magic().create_spell(&stale).await.unwrap();
        repository.magic().create_spell(&fresh).await.unwrap();
        // Holdings back the dues, mirroring how casts produce them
        for spell in [&stale, &fresh] {
            repository
                .magic()
                .insert_spell_holding(&SpellHolding {
                    id: HoldingId::new(),
                    player_id: player.id,
                    spell_id: spell.id,
                    spell_name: spell.name.clone(),
                    amount: 1,
                })
                .await
                .unwrap();
        }

        let now = Utc::now();
        for (spell, due) in [
            (&stale, now - chrono::Duration::hours(1)),
            (&fresh, now + chrono::Duration::hours(1)),
        ] {
            repository
                .magic()
                .insert_spell_due(&SpellDue {
                    id: DueId::new(),
                    player_id: player.id,
                    spell_id: spell.id,
                    spell_name: spell.name.clone(),
                    source_id: player.id,
                    due,
                })
                .await
                .unwrap();
        }

        let purged = sweep_expired_spells(&repository).await.unwrap();
        assert_eq!(purged, 1);

        let remaining = repository.magic().dues_on(player.id).await.unwrap();
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].spell_name, "haze");
    }
}
