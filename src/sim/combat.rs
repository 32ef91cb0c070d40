//! Combat resolution, run once per tick after every agent has moved
//!
//! Order matters and is fixed:
//! 1. Player projectiles vs enemies (first hit consumes the shot), then obstacles
//! 2. Melee swing vs enemies, once per swing per target
//! 3. Contact damage from enemies touching the player
//! 4. Enemy projectiles vs the player, then obstacles
//! 5. Boss slams raised this tick
//! 6. Death dispatch: events, XP and coins, level-ups
//! 7. Body blocking: player push-out, then obstacles, then arena bounds

use rand::Rng;

use super::collision::{circle_circle, circle_circle_info, circle_rect, separate_circle_rect};
use super::entity::{Archetype, Body};
use super::events::GameEvent;
use super::player::Player;
use super::spawner::Spawner;
use super::state::GameState;
use super::upgrades::Progression;
use super::world::{Bounds, Obstacle};

/// Run the whole pass. `first_event` marks where this tick's events start.
pub fn resolve(state: &mut GameState, first_event: usize) {
    let GameState {
        player,
        spawner,
        obstacles,
        bounds,
        progression,
        rng,
        events,
        ..
    } = state;

    player_projectiles(player, spawner, obstacles);
    melee(player, spawner);
    contact_damage(player, spawner, events);
    enemy_projectiles(player, spawner, obstacles, events);
    boss_slams(player, events, first_event);
    dispatch_deaths(player, spawner, progression, rng, events);
    body_blocking(player, spawner, obstacles, bounds);
}

/// Bodies the player can hit, in a stable order: enemies, then the boss
fn targets_mut(spawner: &mut Spawner) -> impl Iterator<Item = (&mut Body, &mut Option<u32>)> {
    let enemies = spawner
        .enemies
        .iter_mut()
        .map(|e| (&mut e.body, &mut e.last_swing));
    let boss = spawner
        .boss
        .iter_mut()
        .map(|b| (&mut b.body, &mut b.last_swing));
    enemies.chain(boss).filter(|(body, _)| body.alive)
}

fn player_projectiles(player: &mut Player, spawner: &mut Spawner, obstacles: &[Obstacle]) {
    for shot in player.projectiles.iter_mut().filter(|p| p.alive) {
        let circle = shot.circle();
        let hit = targets_mut(spawner).find(|(body, _)| circle_circle(circle, body.circle()));
        if let Some((body, _)) = hit {
            body.take_damage(shot.damage);
            shot.alive = false;
            continue;
        }
        if obstacles.iter().any(|o| circle_rect(circle, o)) {
            shot.alive = false;
        }
    }
    player.projectiles.retain(|p| p.alive);
}

fn melee(player: &Player, spawner: &mut Spawner) {
    let Some((sector, serial)) = player.swing_sector() else {
        return;
    };
    let damage = player.melee_damage();
    for (body, last_swing) in targets_mut(spawner) {
        if *last_swing != Some(serial) && sector.hits_circle(body.circle()) {
            *last_swing = Some(serial);
            body.take_damage(damage);
        }
    }
}

fn contact_damage(player: &mut Player, spawner: &mut Spawner, events: &mut Vec<GameEvent>) {
    let (pos, radius) = (player.body.pos, player.body.radius);
    for enemy in spawner.enemies.iter_mut() {
        if enemy.can_damage(pos, radius) && player.take_damage(enemy.damage) {
            enemy.on_contact();
            events.push(GameEvent::PlayerHit {
                damage: enemy.damage,
                hp: player.body.hp,
            });
        }
    }
    if let Some(boss) = spawner.boss.as_mut() {
        if boss.can_damage(pos, radius) && player.take_damage(boss.damage) {
            boss.on_contact();
            events.push(GameEvent::PlayerHit {
                damage: boss.damage,
                hp: player.body.hp,
            });
        }
    }
}

fn enemy_projectiles(
    player: &mut Player,
    spawner: &mut Spawner,
    obstacles: &[Obstacle],
    events: &mut Vec<GameEvent>,
) {
    let shots = spawner
        .enemies
        .iter_mut()
        .flat_map(|e| e.projectiles.iter_mut())
        .filter(|p| p.alive);
    for shot in shots {
        let circle = shot.circle();
        if circle_circle(circle, player.body.circle()) {
            shot.alive = false;
            if player.take_damage(shot.damage) {
                events.push(GameEvent::PlayerHit {
                    damage: shot.damage,
                    hp: player.body.hp,
                });
            }
            continue;
        }
        if obstacles.iter().any(|o| circle_rect(circle, o)) {
            shot.alive = false;
        }
    }
    for enemy in spawner.enemies.iter_mut() {
        enemy.projectiles.retain(|p| p.alive);
    }
}

fn boss_slams(player: &mut Player, events: &mut Vec<GameEvent>, first_event: usize) {
    let slams: Vec<_> = events[first_event.min(events.len())..]
        .iter()
        .filter_map(|e| match *e {
            GameEvent::BossSlam { pos, radius, damage } => Some((pos, radius, damage)),
            _ => None,
        })
        .collect();

    for (pos, radius, damage) in slams {
        if player.body.is_near(pos, radius + player.body.radius) && player.take_damage(damage) {
            events.push(GameEvent::PlayerHit {
                damage,
                hp: player.body.hp,
            });
        }
    }
}

fn dispatch_deaths(
    player: &mut Player,
    spawner: &mut Spawner,
    progression: &mut Progression,
    rng: &mut impl Rng,
    events: &mut Vec<GameEvent>,
) {
    let mut deaths = Vec::new();
    for enemy in spawner.enemies.iter_mut() {
        if !enemy.body.alive && !enemy.death_reported {
            enemy.death_reported = true;
            deaths.push(GameEvent::EnemyDied {
                id: enemy.id,
                archetype: enemy.archetype(),
                pos: enemy.body.pos,
                xp: enemy.xp_value,
                coins: enemy.coin_value,
            });
        }
    }
    if let Some(boss) = spawner.boss.as_mut() {
        if !boss.body.alive && !boss.death_reported {
            boss.death_reported = true;
            log::info!("Boss defeated");
            deaths.push(GameEvent::EnemyDied {
                id: boss.id,
                archetype: Archetype::Boss,
                pos: boss.body.pos,
                xp: boss.xp_value,
                coins: boss.coin_value,
            });
        }
    }

    for death in deaths {
        if let GameEvent::EnemyDied { xp, coins, .. } = death {
            player.gain(xp, coins);
        }
        events.push(death);
        if progression.check_level_up(player, rng) {
            events.push(GameEvent::LevelUp {
                level: player.level,
            });
        }
    }
}

/// Enemies cannot overlap the (immovable) player or sit inside obstacles
fn body_blocking(player: &Player, spawner: &mut Spawner, obstacles: &[Obstacle], bounds: &Bounds) {
    let player_circle = player.body.circle();
    let bodies = spawner
        .enemies
        .iter_mut()
        .map(|e| &mut e.body)
        .chain(spawner.boss.iter_mut().map(|b| &mut b.body))
        .filter(|b| b.alive);

    // Obstacles resolve after the player push so the push cannot end inside
    // one; the arena clamp goes last
    for body in bodies {
        let mut circle = body.circle();
        if let Some(contact) = circle_circle_info(player_circle, circle) {
            circle.pos += contact.normal * contact.overlap;
        }
        for obstacle in obstacles {
            separate_circle_rect(&mut circle, obstacle);
        }
        body.pos = bounds.clamp_circle(circle.pos, circle.radius);
    }
}
