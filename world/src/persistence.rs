//! Versioned, whitespace-delimited text save format.
//!
//! A save starts with a `bulwark-save <version>` header and a `state` line
//! holding the pause flag, the RNG state, the clock, the gold balance and the
//! selected tower kind. Sections follow in a fixed order (towers, portals,
//! spawners, walls, mobs, projectiles), each a `<label> <count>` line followed
//! by `count` records with a fixed number of fields.
//!
//! Target references, routes and aim timers are never written; entities
//! re-derive them on their next tick. Effect timers are stored as the time
//! remaining at the saved moment. Entities already marked for deletion are
//! left out, as the next purge would remove them anyway.

use std::{
    fmt::{self, Display, Formatter},
    iter::Enumerate,
    str::{FromStr, Lines},
};

use base64::{engine::general_purpose::STANDARD, Engine as _};
use bulwark_core::{
    CellCoord, DamagePayload, Difficulty, Energy, Entity, EntityKind, MobKind, OwnerId, Position,
    RunState, TowerKind, UpgradeKind, Vitals,
};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use thiserror::Error;

use crate::{
    block::{Block, BlockPayload, Wall},
    config::WorldConfig,
    effect::Countdown,
    mob::{Defense, Freeze, Mob, MobProfile, Poison, Status},
    projectile::Projectile,
    spawner::{MobDistribution, Spawner, SpawnerError},
    tower::Tower,
    World,
};

/// Version written to, and accepted from, the save header.
pub const SAVE_VERSION: u32 = 1;

const HEADER: &str = "bulwark-save";
const NONE_TOKEN: &str = "-";

const TOWER_FIELDS: usize = 10 + UpgradeKind::ALL.len();
const PORTAL_FIELDS: usize = 5;
const SPAWNER_FIELDS: usize = 7 + MobKind::ALL.len();
const WALL_FIELDS: usize = 6;
const MOB_FIELDS: usize = 24;
const PROJECTILE_FIELDS: usize = 18;
const STATE_FIELDS: usize = 8;

/// Errors raised while reading a save.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum LoadError {
    /// The document does not start with the save header.
    #[error("missing `bulwark-save` header")]
    MissingHeader,
    /// The header names a version this build cannot read.
    #[error("unsupported save version `{0}`")]
    UnsupportedVersion(String),
    /// The document ended before a required line.
    #[error("unexpected end of save, expected {expected}")]
    UnexpectedEnd {
        /// What was expected next.
        expected: &'static str,
    },
    /// A section label differs from the one required at this point.
    #[error("line {line}: expected section `{expected}`, found `{found}`")]
    UnexpectedSection {
        /// Required label.
        expected: &'static str,
        /// Label found.
        found: String,
        /// One-based line number.
        line: usize,
    },
    /// A section count is missing or not a number.
    #[error("line {line}: invalid {category} count `{token}`")]
    InvalidCount {
        /// Section label.
        category: &'static str,
        /// Offending token.
        token: String,
        /// One-based line number.
        line: usize,
    },
    /// A record has the wrong number of fields.
    #[error("line {line}: {category} record has {found} fields, expected {expected}")]
    FieldCount {
        /// Section label.
        category: &'static str,
        /// Required number of fields.
        expected: usize,
        /// Number of fields present.
        found: usize,
        /// One-based line number.
        line: usize,
    },
    /// A field could not be parsed.
    #[error("line {line}: invalid {field} `{token}`")]
    InvalidField {
        /// Name of the field.
        field: &'static str,
        /// Offending token.
        token: String,
        /// One-based line number.
        line: usize,
    },
    /// Content follows the last section.
    #[error("line {line}: unexpected data after the last section")]
    TrailingData {
        /// One-based line number.
        line: usize,
    },
    /// A spawner record describes an unusable distribution.
    #[error("invalid spawner")]
    Spawner(#[from] SpawnerError),
}

/// Serialises the world to the text save format.
#[must_use]
pub fn save_to_string(world: &World) -> String {
    SaveFile { world }.to_string()
}

/// Restores a world from the text save format.
///
/// Loading is all-or-nothing: any malformed line rejects the whole document.
pub fn load_from_str(source: &str, config: WorldConfig) -> Result<World, LoadError> {
    read_world(source, config).map_err(|error| {
        tracing::warn!(%error, "save rejected");
        error
    })
}

fn read_world(source: &str, config: WorldConfig) -> Result<World, LoadError> {
    let mut reader = Reader {
        lines: source.lines().enumerate(),
    };

    let header = reader.record("header")?;
    if header.tokens.first().copied() != Some(HEADER) {
        return Err(LoadError::MissingHeader);
    }
    let version = header.tokens.get(1).copied().unwrap_or_default();
    if header.tokens.len() != 2 || version != SAVE_VERSION.to_string() {
        return Err(LoadError::UnsupportedVersion(version.to_owned()));
    }

    let mut state = reader.record("state")?;
    state.expect_label("state")?;
    state.expect_len("state", STATE_FIELDS)?;
    let paused = state.flag("paused")?;
    let seed = state.seed()?;
    let stream: u64 = state.parse("rng stream")?;
    let word_pos: u128 = state.parse("rng word position")?;
    let moment: f64 = state.parse("moment")?;
    if !moment.is_finite() {
        return Err(state.invalid("moment", state.cursor - 1));
    }
    let gold = state.float("gold")?;
    let selected = state.optional_code("selected tower", TowerKind::from_code)?;

    let mut rng = ChaCha8Rng::from_seed(seed);
    rng.set_stream(stream);
    rng.set_word_pos(word_pos);

    let mut world = World::with_rng(config, rng);
    world.moment = moment;
    world.gold = gold;
    world.selected = selected;
    world.run_state = if paused {
        RunState::Paused
    } else {
        RunState::Running
    };

    for mut record in reader.section("towers", TOWER_FIELDS)? {
        let block = read_tower(&mut record)?;
        let _ = world.insert_block(block);
    }
    for mut record in reader.section("portals", PORTAL_FIELDS)? {
        let (cell, _, vitals) = read_block_header(&mut record, false)?;
        let lives = record.parse("lives")?;
        let block = Block::portal(cell, lives).with_vitals(vitals);
        let _ = world.insert_block(block);
    }
    for mut record in reader.section("spawners", SPAWNER_FIELDS)? {
        let block = read_spawner(&mut record, &world.config)?;
        let _ = world.insert_block(block);
    }
    for mut record in reader.section("walls", WALL_FIELDS)? {
        let (cell, owner, vitals) = read_block_header(&mut record, true)?;
        let height = record.float("height")?;
        let block = Block::wall(cell, owner, vitals.total(), height).with_vitals(vitals);
        let _ = world.insert_block(block);
    }
    for mut record in reader.section("mobs", MOB_FIELDS)? {
        let mob = read_mob(&mut record, moment)?;
        let _ = world.insert_mob(mob);
    }
    for mut record in reader.section("projectiles", PROJECTILE_FIELDS)? {
        let projectile = read_projectile(&mut record)?;
        let _ = world.insert_projectile(projectile);
    }

    if let Some(line) = reader.next_line() {
        return Err(LoadError::TrailingData { line: line.0 });
    }

    tracing::info!(
        blocks = world.blocks.len(),
        mobs = world.mobs.len(),
        projectiles = world.projectiles.len(),
        moment,
        "save loaded"
    );
    Ok(world)
}

struct SaveFile<'a> {
    world: &'a World,
}

impl Display for SaveFile<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let world = self.world;
        writeln!(f, "{HEADER} {SAVE_VERSION}")?;
        writeln!(
            f,
            "state {} {} {} {} {} {} {}",
            u8::from(!world.run_state.is_running()),
            STANDARD.encode(world.rng.get_seed()),
            world.rng.get_stream(),
            world.rng.get_word_pos(),
            world.moment,
            world.gold,
            world
                .selected
                .map_or_else(|| NONE_TOKEN.to_owned(), |kind| kind.code().to_string()),
        )?;

        let blocks_of = |kind: EntityKind| {
            world
                .blocks
                .iter()
                .map(|(_, block)| block)
                .filter(move |block| !block.is_deleted() && block.kind() == kind)
        };
        let mobs = || world.mobs.iter().map(|(_, mob)| mob).filter(|mob| !mob.is_deleted());
        let projectiles = || {
            world
                .projectiles
                .iter()
                .map(|(_, projectile)| projectile)
                .filter(|projectile| !projectile.is_deleted())
        };

        writeln!(f, "towers {}", blocks_of(EntityKind::Tower).count())?;
        for block in blocks_of(EntityKind::Tower) {
            write_block_header(f, block, true)?;
            if let Some(tower) = block.as_tower() {
                write!(
                    f,
                    " {} {} {} {} {}",
                    tower.kind().code(),
                    tower.experience(),
                    tower.energy().current(),
                    tower.orientation(),
                    tower.invested(),
                )?;
                for upgrade in UpgradeKind::ALL {
                    match tower.upgrade_level(upgrade) {
                        Some(level) => write!(f, " {level}")?,
                        None => write!(f, " {NONE_TOKEN}")?,
                    }
                }
            }
            writeln!(f)?;
        }

        writeln!(f, "portals {}", blocks_of(EntityKind::Portal).count())?;
        for block in blocks_of(EntityKind::Portal) {
            write_block_header(f, block, false)?;
            let lives = block.as_portal().map_or(0, |portal| portal.lives);
            writeln!(f, " {lives}")?;
        }

        writeln!(f, "spawners {}", blocks_of(EntityKind::Spawner).count())?;
        for block in blocks_of(EntityKind::Spawner) {
            write_block_header(f, block, false)?;
            if let Some(spawner) = block.as_spawner() {
                write!(
                    f,
                    " {} {} {}",
                    spawner.difficulty().code(),
                    spawner.stock(),
                    spawner.experience(),
                )?;
                for kind in MobKind::ALL {
                    let weight = spawner
                        .distribution()
                        .entries()
                        .iter()
                        .filter(|(entry, _)| *entry == kind)
                        .map(|(_, weight)| *weight)
                        .sum::<f32>();
                    write!(f, " {weight}")?;
                }
            }
            writeln!(f)?;
        }

        writeln!(f, "walls {}", blocks_of(EntityKind::Wall).count())?;
        for block in blocks_of(EntityKind::Wall) {
            write_block_header(f, block, true)?;
            let height = match block.payload() {
                BlockPayload::Wall(Wall { height }) => *height,
                _ => 0.0,
            };
            writeln!(f, " {height}")?;
        }

        writeln!(f, "mobs {}", mobs().count())?;
        for mob in mobs() {
            write_mob(f, mob, world.moment)?;
        }

        writeln!(f, "projectiles {}", projectiles().count())?;
        for projectile in projectiles() {
            write_projectile(f, projectile)?;
        }
        Ok(())
    }
}

fn write_owner(f: &mut Formatter<'_>, owner: Option<OwnerId>) -> fmt::Result {
    match owner {
        Some(owner) => write!(f, " {}", owner.get()),
        None => write!(f, " {NONE_TOKEN}"),
    }
}

/// `column row [owner] total current`
fn write_block_header(f: &mut Formatter<'_>, block: &Block, with_owner: bool) -> fmt::Result {
    let cell = block.cell();
    write!(f, "{} {}", cell.column(), cell.row())?;
    if with_owner {
        write_owner(f, block.owner())?;
    }
    write!(f, " {} {}", block.vitals().total(), block.vitals().current())
}

fn write_mob(f: &mut Formatter<'_>, mob: &Mob, moment: f64) -> fmt::Result {
    let status = mob.status();
    let defense = mob.defense();
    let (freeze_multiplier, deceleration) = status
        .freeze
        .map_or((1.0, 0.0), |freeze| (freeze.multiplier, freeze.deceleration));
    let (poison_dps, poison_stacks) = status
        .poison
        .map_or((0.0, 0), |poison| (poison.dps, poison.stacks));

    writeln!(
        f,
        "{} {} {} {} {} {} {} {} {} {} {} {} {} {} {} {} {} {} {} {} {} {} {} {}",
        mob.kind().code(),
        mob.position().x,
        mob.position().y,
        mob.vitals().total(),
        mob.vitals().current(),
        mob.energy().current(),
        mob.bounty_scaling,
        mob.experience_reward(),
        mob.lives_cost(),
        defense.shield,
        defense.efficiency,
        defense.durability,
        u8::from(defense.poisonable),
        u8::from(defense.slowable),
        u8::from(defense.stunnable),
        status.base_speed(),
        status.speed(),
        freeze_multiplier,
        status.freeze_remaining(moment),
        deceleration,
        status.stun_remaining(moment),
        poison_dps,
        poison_stacks,
        status.poison_remaining(moment),
    )
}

fn write_projectile(f: &mut Formatter<'_>, projectile: &Projectile) -> fmt::Result {
    let position = projectile.position();
    write!(f, "{} {}", position.x, position.y)?;
    write_owner(f, projectile.owner())?;
    let destination = projectile.destination();
    let payload = projectile.payload();
    writeln!(
        f,
        " {} {} {} {} {} {} {} {} {} {} {} {} {} {} {}",
        projectile.speed(),
        destination.x,
        destination.y,
        payload.damage,
        payload.aoe_radius,
        payload.accuracy,
        payload.speed_multiplier,
        payload.freeze_duration,
        payload.deceleration,
        payload.stun_probability,
        payload.stun_duration,
        payload.poison_dps,
        payload.poison_duration,
        payload.crit_probability,
        payload.crit_multiplier,
    )
}

fn read_block_header(
    record: &mut Record<'_>,
    with_owner: bool,
) -> Result<(CellCoord, Option<OwnerId>, Vitals), LoadError> {
    let column = record.parse("column")?;
    let row = record.parse("row")?;
    let owner = if with_owner {
        record.owner()?
    } else {
        None
    };
    let total = record.float("total health")?;
    let current = record.float("current health")?;
    Ok((
        CellCoord::new(column, row),
        owner,
        Vitals::with_current(total, current),
    ))
}

fn read_tower(record: &mut Record<'_>) -> Result<Block, LoadError> {
    let (cell, owner, vitals) = read_block_header(record, true)?;
    let kind = record.code("tower kind", TowerKind::from_code)?;
    let mut tower = Tower::new(kind);
    tower.experience = record.float("experience")?.max(0.0);
    let energy = record.float("energy")?;
    tower.orientation = record.float("orientation")?;
    tower.invested = record.float("invested")?;

    for upgrade in UpgradeKind::ALL {
        let index = record.cursor;
        let token = record.next_token();
        let supported = tower
            .upgrades
            .iter_mut()
            .find(|(kind, _)| *kind == upgrade)
            .map(|(_, level)| level);
        match (supported, token) {
            (None, Some(NONE_TOKEN)) => {}
            (Some(level), Some(token)) => {
                *level = token
                    .parse()
                    .map_err(|_| record.invalid("upgrade level", index))?;
            }
            _ => return Err(record.invalid("upgrade level", index)),
        }
    }

    tower.energy = Energy::with_current(
        tower.profile().energy_capacity,
        tower.attack_speed(),
        energy,
    );
    Ok(Block::new(cell, owner, vitals.total(), BlockPayload::Tower(tower)).with_vitals(vitals))
}

fn read_spawner(record: &mut Record<'_>, config: &WorldConfig) -> Result<Block, LoadError> {
    let (cell, _, vitals) = read_block_header(record, false)?;
    let difficulty = record.code("difficulty", Difficulty::from_code)?;
    let stock = record.float("stock")?;
    let experience = record.parse("wave counter")?;

    let mut entries = Vec::new();
    for kind in MobKind::ALL {
        let weight = record.float("mob weight")?;
        if weight > 0.0 {
            entries.push((kind, weight));
        }
    }
    let distribution = MobDistribution::new(entries)?;
    let spawner =
        Spawner::with_distribution(difficulty, distribution, config).with_progress(stock, experience);
    Ok(Block::spawner(cell, spawner).with_vitals(vitals))
}

fn read_mob(record: &mut Record<'_>, moment: f64) -> Result<Mob, LoadError> {
    let kind = record.code("mob kind", MobKind::from_code)?;
    let x = record.float("x")?;
    let y = record.float("y")?;
    let total = record.float("total health")?;
    let current = record.float("current health")?;
    let energy = record.float("energy")?;
    let bounty_scaling = record.float("bounty scaling")?;
    let experience = record.float("experience")?;
    let lives_cost = record.parse("lives cost")?;
    let defense = Defense {
        shield: record.float("shield")?,
        efficiency: record.float("shield efficiency")?,
        durability: record.float("shield durability")?.max(0.0),
        poisonable: record.flag("poisonable")?,
        slowable: record.flag("slowable")?,
        stunnable: record.flag("stunnable")?,
    };
    let base_speed = record.float("base speed")?;
    let speed = record.float("speed")?;
    let freeze_multiplier = record.float("freeze multiplier")?;
    let freeze_remaining = record.float("freeze remaining")?;
    let deceleration = record.float("deceleration")?;
    let stun_remaining = record.float("stun remaining")?;
    let poison_dps = record.float("poison dps")?;
    let poison_stacks = record.parse("poison stacks")?;
    let poison_remaining = record.float("poison remaining")?;

    let profile = MobProfile::of(kind);
    let mut status = Status::new(base_speed, profile.acceleration).with_speed(speed);
    if freeze_remaining > 0.0 {
        status.freeze = Some(Freeze {
            multiplier: freeze_multiplier,
            deceleration,
            timer: Countdown::new(moment, freeze_remaining),
        });
    }
    if stun_remaining > 0.0 {
        status.stun = Some(Countdown::new(moment, stun_remaining));
    }
    if poison_remaining > 0.0 && poison_stacks > 0 {
        status.poison = Some(Poison {
            dps: poison_dps,
            stacks: poison_stacks,
            timer: Countdown::new(moment, poison_remaining),
        });
    }

    let mut mob = Mob::new(kind, Position::new(x, y), total)
        .with_defense(defense)
        .with_lives_cost(lives_cost);
    mob.vitals = Vitals::with_current(total, current);
    mob.energy = Energy::with_current(profile.energy_capacity, profile.energy_refill, energy);
    mob.bounty_scaling = bounty_scaling;
    mob.experience = experience;
    mob.status = status;
    Ok(mob)
}

fn read_projectile(record: &mut Record<'_>) -> Result<Projectile, LoadError> {
    let x = record.float("x")?;
    let y = record.float("y")?;
    let owner = record.owner()?;
    let speed = record.float("speed")?;
    let destination = Position::new(record.float("destination x")?, record.float("destination y")?);
    let payload = DamagePayload {
        damage: record.float("damage")?,
        aoe_radius: record.float("aoe radius")?,
        accuracy: record.float("accuracy")?,
        speed_multiplier: record.float("speed multiplier")?,
        freeze_duration: record.float("freeze duration")?,
        deceleration: record.float("deceleration")?,
        stun_probability: record.float("stun probability")?,
        stun_duration: record.float("stun duration")?,
        poison_dps: record.float("poison dps")?,
        poison_duration: record.float("poison duration")?,
        crit_probability: record.float("crit probability")?,
        crit_multiplier: record.float("crit multiplier")?,
    };

    Ok(Projectile {
        position: Position::new(x, y),
        owner,
        vitals: Vitals::new(1.0),
        speed: speed.max(0.0),
        destination,
        target: None,
        tower: None,
        payload,
    })
}

struct Reader<'a> {
    lines: Enumerate<Lines<'a>>,
}

impl<'a> Reader<'a> {
    /// Next non-blank line with its one-based number.
    fn next_line(&mut self) -> Option<(usize, &'a str)> {
        self.lines
            .by_ref()
            .map(|(index, line)| (index + 1, line))
            .find(|(_, line)| !line.trim().is_empty())
    }

    fn record(&mut self, expected: &'static str) -> Result<Record<'a>, LoadError> {
        let (line, text) = self
            .next_line()
            .ok_or(LoadError::UnexpectedEnd { expected })?;
        Ok(Record {
            line,
            tokens: text.split_whitespace().collect(),
            cursor: 0,
        })
    }

    /// Reads a `<label> <count>` line and the records that follow it.
    fn section(
        &mut self,
        label: &'static str,
        fields: usize,
    ) -> Result<Vec<Record<'a>>, LoadError> {
        let mut header = self.record(label)?;
        header.expect_label(label)?;
        let count_token = header.tokens.get(1).copied().unwrap_or_default();
        let count: usize = match (header.tokens.len(), count_token.parse()) {
            (2, Ok(count)) => count,
            _ => {
                return Err(LoadError::InvalidCount {
                    category: label,
                    token: count_token.to_owned(),
                    line: header.line,
                })
            }
        };

        let mut records = Vec::with_capacity(count);
        for _ in 0..count {
            let record = self.record(label)?;
            record.expect_len(label, fields)?;
            records.push(record);
        }
        Ok(records)
    }
}

struct Record<'a> {
    line: usize,
    tokens: Vec<&'a str>,
    cursor: usize,
}

impl<'a> Record<'a> {
    fn expect_label(&mut self, label: &'static str) -> Result<(), LoadError> {
        let found = self.tokens.first().copied().unwrap_or_default();
        if found != label {
            return Err(LoadError::UnexpectedSection {
                expected: label,
                found: found.to_owned(),
                line: self.line,
            });
        }
        self.cursor = 1;
        Ok(())
    }

    fn expect_len(&self, category: &'static str, expected: usize) -> Result<(), LoadError> {
        if self.tokens.len() != expected {
            return Err(LoadError::FieldCount {
                category,
                expected,
                found: self.tokens.len(),
                line: self.line,
            });
        }
        Ok(())
    }

    fn next_token(&mut self) -> Option<&'a str> {
        let token = self.tokens.get(self.cursor).copied();
        self.cursor += 1;
        token
    }

    fn invalid(&self, field: &'static str, index: usize) -> LoadError {
        LoadError::InvalidField {
            field,
            token: self.tokens.get(index).copied().unwrap_or_default().to_owned(),
            line: self.line,
        }
    }

    fn parse<T: FromStr>(&mut self, field: &'static str) -> Result<T, LoadError> {
        let index = self.cursor;
        self.next_token()
            .and_then(|token| token.parse().ok())
            .ok_or_else(|| self.invalid(field, index))
    }

    fn float(&mut self, field: &'static str) -> Result<f32, LoadError> {
        let index = self.cursor;
        let value: f32 = self.parse(field)?;
        if value.is_finite() {
            Ok(value)
        } else {
            Err(self.invalid(field, index))
        }
    }

    fn flag(&mut self, field: &'static str) -> Result<bool, LoadError> {
        let index = self.cursor;
        match self.next_token() {
            Some("0") => Ok(false),
            Some("1") => Ok(true),
            _ => Err(self.invalid(field, index)),
        }
    }

    fn owner(&mut self) -> Result<Option<OwnerId>, LoadError> {
        if self.tokens.get(self.cursor).copied() == Some(NONE_TOKEN) {
            self.cursor += 1;
            return Ok(None);
        }
        self.parse("owner").map(|owner| Some(OwnerId::new(owner)))
    }

    fn code<T>(&mut self, field: &'static str, resolve: fn(u8) -> Option<T>) -> Result<T, LoadError> {
        let index = self.cursor;
        let code: u8 = self.parse(field)?;
        resolve(code).ok_or_else(|| self.invalid(field, index))
    }

    fn optional_code<T>(
        &mut self,
        field: &'static str,
        resolve: fn(u8) -> Option<T>,
    ) -> Result<Option<T>, LoadError> {
        if self.tokens.get(self.cursor).copied() == Some(NONE_TOKEN) {
            self.cursor += 1;
            return Ok(None);
        }
        self.code(field, resolve).map(Some)
    }

    fn seed(&mut self) -> Result<[u8; 32], LoadError> {
        let index = self.cursor;
        self.next_token()
            .and_then(|token| STANDARD.decode(token).ok())
            .and_then(|bytes| <[u8; 32]>::try_from(bytes).ok())
            .ok_or_else(|| self.invalid("rng seed", index))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bulwark_core::{Command, Event};
    use std::time::Duration;

    fn populated_world() -> World {
        let mut world = World::new(WorldConfig::default(), Difficulty::Normal, 21).expect("world");
        let _ = world.insert_block(Block::tower(
            CellCoord::new(6, 6),
            OwnerId::PLAYER,
            Tower::new(TowerKind::Frost),
        ));
        let mut events = Vec::new();
        for _ in 0..40 {
            crate::apply(
                &mut world,
                Command::Tick {
                    dt: Duration::from_millis(250),
                },
                &mut events,
            );
        }
        world
    }

    #[test]
    fn save_load_save_is_stable() {
        let world = populated_world();
        let saved = save_to_string(&world);
        let restored = load_from_str(&saved, WorldConfig::default()).expect("load");
        assert_eq!(save_to_string(&restored), saved);
    }

    #[test]
    fn restored_world_keeps_clock_gold_and_counts() {
        let world = populated_world();
        let restored =
            load_from_str(&save_to_string(&world), WorldConfig::default()).expect("load");
        assert_eq!(restored.moment, world.moment);
        assert_eq!(restored.gold, world.gold);
        assert_eq!(restored.blocks.len(), world.blocks.len());
        assert_eq!(restored.mobs.len(), world.mobs.len());
        assert_eq!(restored.projectiles.len(), world.projectiles.len());
    }

    #[test]
    fn restored_rng_continues_the_same_stream() {
        let world = populated_world();
        let mut restored =
            load_from_str(&save_to_string(&world), WorldConfig::default()).expect("load");
        let mut original = world.rng.clone();
        use rand::RngCore;
        assert_eq!(restored.rng.next_u64(), original.next_u64());
    }

    #[test]
    fn paused_flag_survives_reload() {
        let mut world = World::empty(WorldConfig::default(), 3);
        let mut events = Vec::new();
        crate::apply(&mut world, Command::TogglePause, &mut events);
        assert!(matches!(
            events.last(),
            Some(Event::RunStateChanged {
                state: RunState::Paused
            })
        ));
        let restored =
            load_from_str(&save_to_string(&world), WorldConfig::default()).expect("load");
        assert_eq!(restored.run_state, RunState::Paused);
    }

    #[test]
    fn effect_remainders_are_rebased_to_the_saved_moment() {
        let mut world = World::empty(WorldConfig::default(), 3);
        world.moment = 10.0;
        let mut mob = Mob::new(MobKind::Crawler, Position::new(2.5, 2.5), 40.0);
        mob.status.stun = Some(Countdown::new(9.0, 3.0));
        let _ = world.insert_mob(mob);

        let restored =
            load_from_str(&save_to_string(&world), WorldConfig::default()).expect("load");
        let remaining = restored
            .mobs
            .iter()
            .next()
            .map(|(_, mob)| mob.status().stun_remaining(10.0));
        assert_eq!(remaining, Some(2.0));
    }

    #[test]
    fn missing_header_is_rejected() {
        let error = load_from_str("state 0", WorldConfig::default()).err();
        assert_eq!(error, Some(LoadError::MissingHeader));
    }

    #[test]
    fn unknown_version_is_rejected() {
        let error = load_from_str("bulwark-save 9\n", WorldConfig::default()).err();
        assert_eq!(error, Some(LoadError::UnsupportedVersion("9".to_owned())));
    }

    #[test]
    fn short_record_is_rejected_with_field_count() {
        let world = World::new(WorldConfig::default(), Difficulty::Easy, 1).expect("world");
        let saved = save_to_string(&world);
        let mut lines: Vec<&str> = saved.lines().collect();
        let portal = lines
            .iter()
            .position(|line| line.starts_with("portals"))
            .map(|index| index + 1)
            .expect("portal section");
        lines[portal] = "0 0 1";
        let broken = lines.join("\n");

        match load_from_str(&broken, WorldConfig::default()) {
            Err(LoadError::FieldCount {
                category: "portals",
                expected: PORTAL_FIELDS,
                found: 3,
                ..
            }) => {}
            other => panic!("unexpected result {other:?}"),
        }
    }

    #[test]
    fn malformed_field_names_the_field() {
        let world = World::empty(WorldConfig::default(), 0);
        let saved = save_to_string(&world).replace("projectiles 0", "projectiles 1\n1 2 - x 0 0 1 0 1 1 0 0 0 0 0 0 0 1");
        match load_from_str(&saved, WorldConfig::default()) {
            Err(LoadError::InvalidField { field: "speed", token, .. }) => assert_eq!(token, "x"),
            other => panic!("unexpected result {other:?}"),
        }
    }

    #[test]
    fn trailing_data_is_rejected() {
        let world = World::empty(WorldConfig::default(), 0);
        let saved = format!("{}extra\n", save_to_string(&world));
        assert!(matches!(
            load_from_str(&saved, WorldConfig::default()),
            Err(LoadError::TrailingData { .. })
        ));
    }

    #[test]
    fn empty_spawner_distribution_fails_the_load() {
        let world = World::empty(WorldConfig::default(), 0);
        let saved = save_to_string(&world).replace("spawners 0", "spawners 1\n0 0 1 1 0 0 0 0 0 0 0");
        assert_eq!(
            load_from_str(&saved, WorldConfig::default()).err(),
            Some(LoadError::Spawner(SpawnerError::EmptyDistribution))
        );
    }
}
