//! World model: players, their characters and the static map of a match.
//!
//! `World` is a plain state machine. Locking and timing belong to the
//! simulation loop that owns it.

mod control;
mod map;
mod object;
mod physics;
mod player;
mod rect;
mod rules;
mod spawn;

use rand::{SeedableRng, rngs::StdRng};

pub use control::{ControlInput, ControlKey};
pub use map::{SENTINEL_ABOVE, SENTINEL_OUTSIDE, TILE_EMPTY, TileKind, WorldMap};
pub use object::{Anim, CHARACTER_TYPE, Vector, WorldObject};
pub use physics::{EFFECT_SPAWN, EFFECT_SPRING, EFFECT_STOMP};
pub use player::{Controls, Player};
pub use rect::Rect;
pub use rules::WorldRules;
pub use spawn::{MAX_SPAWN_ATTEMPTS, SAFE_DISTANCE};

use super::{
    error::{LoginError, WorldError},
    login::LoginRequest,
    value_object::ClientId,
};

pub struct World {
    rules: WorldRules,
    map: WorldMap,
    players: Vec<Player>,
    objects: Vec<WorldObject>,
    /// Pixel rectangle covered by the map
    bounds: Rect,
    rng: StdRng,
}

impl World {
    pub fn new(rules: WorldRules, map: WorldMap) -> Self {
        Self::with_rng(rules, map, StdRng::from_entropy())
    }

    /// Create a world whose spawn places are reproducible.
    pub fn with_seed(rules: WorldRules, map: WorldMap, seed: u64) -> Self {
        Self::with_rng(rules, map, StdRng::seed_from_u64(seed))
    }

    fn with_rng(rules: WorldRules, map: WorldMap, rng: StdRng) -> Self {
        let size = f64::from(rules.block_size);
        let bounds = Rect::new(
            0.0,
            0.0,
            map.width() as f64 * size,
            map.height() as f64 * size,
        );
        Self {
            rules,
            map,
            players: Vec::new(),
            objects: Vec::new(),
            bounds,
            rng,
        }
    }

    pub fn rules(&self) -> &WorldRules {
        &self.rules
    }

    pub fn map(&self) -> &WorldMap {
        &self.map
    }

    pub fn bounds(&self) -> &Rect {
        &self.bounds
    }

    pub fn players(&self) -> &[Player] {
        &self.players
    }

    pub fn objects(&self) -> &[WorldObject] {
        &self.objects
    }

    pub fn player(&self, client_id: &ClientId) -> Option<&Player> {
        self.players.iter().find(|p| &p.client_id == client_id)
    }

    pub fn has_player(&self, client_id: &ClientId) -> bool {
        self.player(client_id).is_some()
    }

    /// Add a player and spawn its character at a safe place.
    ///
    /// When no safe place is found the player is removed again.
    pub fn add_player(&mut self, player: Player) -> Result<(), WorldError> {
        let client_id = player.client_id.clone();
        self.players.push(player);

        if let Err(e) = self.spawn_character(&client_id) {
            self.players.retain(|p| p.client_id != client_id);
            return Err(e);
        }
        tracing::debug!("Player with client ID {} added to the world", client_id);
        Ok(())
    }

    /// Remove a player together with every object it owns.
    pub fn remove_player(&mut self, client_id: &ClientId) -> Result<Player, WorldError> {
        let index = self
            .players
            .iter()
            .position(|p| &p.client_id == client_id)
            .ok_or_else(|| WorldError::PlayerNotFound(client_id.to_string()))?;

        tracing::debug!("Removing player with client ID {} from the game", client_id);
        let player = self.players.remove(index);
        self.objects.retain(|obj| &obj.parent_id != client_id);
        Ok(player)
    }

    /// Validate a login request body and add the player on success.
    pub fn login(&mut self, client_id: &ClientId, body: &str) -> Result<(), LoginError> {
        let request = LoginRequest::parse(body)?;
        request.validate()?;

        if self.has_player(client_id) {
            return Err(LoginError::AlreadyInGame(client_id.to_string()));
        }
        if self.players.len() >= self.rules.max_player {
            return Err(LoginError::ServerFull {
                max: self.rules.max_player,
            });
        }
        if self.players.iter().any(|p| p.name == request.name) {
            return Err(LoginError::NameTaken(request.name));
        }

        self.add_player(Player::new(client_id.clone(), request.name, request.color))?;
        Ok(())
    }

    /// Update the held controls of a player.
    pub fn apply_control(
        &mut self,
        client_id: &ClientId,
        input: ControlInput,
    ) -> Result<(), WorldError> {
        let player = self
            .players
            .iter_mut()
            .find(|p| &p.client_id == client_id)
            .ok_or_else(|| WorldError::PlayerNotFound(client_id.to_string()))?;
        player.controls.apply(input);
        Ok(())
    }

    /// Pairs of object IDs whose rectangles overlap.
    pub fn collisions(&self) -> Vec<(String, String)> {
        let mut pairs = Vec::new();
        for (i, a) in self.objects.iter().enumerate() {
            for b in &self.objects[i + 1..] {
                if a.rect().collides(&b.rect()) {
                    pairs.push((a.id.clone(), b.id.clone()));
                }
            }
        }
        pairs
    }

    fn spawn_character(&mut self, client_id: &ClientId) -> Result<(), WorldError> {
        let others: Vec<Rect> = self.objects.iter().map(WorldObject::rect).collect();
        let (x, y) = spawn::find_safe_place(
            &mut self.rng,
            &self.map,
            self.rules.block_size,
            &self.bounds,
            &others,
        )?;
        let size = f64::from(self.rules.block_size);
        self.objects
            .push(WorldObject::character(client_id.clone(), x, y, size));
        Ok(())
    }
}
