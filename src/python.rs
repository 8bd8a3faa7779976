//! Python bindings, built with the `python` feature.

use pyo3::exceptions::{PyRuntimeError, PyValueError};
use pyo3::prelude::*;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::collections::HashMap;

use crate::error::LeagueError;
use crate::fixture::Match;
use crate::outcome::simulate_match;
use crate::projection::ProjectionConfig;
use crate::standings::{compute_standings_with_record, compute_table, Standing};
use crate::team::Team;
use crate::League;

impl From<LeagueError> for PyErr {
    fn from(err: LeagueError) -> PyErr {
        if err.is_precondition() {
            PyValueError::new_err(err.to_string())
        } else {
            PyRuntimeError::new_err(err.to_string())
        }
    }
}

#[pyclass(name = "Team")]
#[derive(Clone, Debug)]
pub struct PyTeam {
    #[pyo3(get, set)]
    pub id: u32,

    #[pyo3(get, set)]
    pub name: String,

    #[pyo3(get, set)]
    pub strength: u32,
}

#[pymethods]
impl PyTeam {
    #[new]
    pub fn new(id: u32, name: String, strength: u32) -> Self {
        PyTeam { id, name, strength }
    }

    fn __repr__(&self) -> String {
        format!("Team({}, {:?}, {})", self.id, self.name, self.strength)
    }
}

impl From<PyTeam> for Team {
    fn from(team: PyTeam) -> Team {
        Team::new(team.id, team.name, team.strength)
    }
}

/// A fixture; played when both goal counts are set.
#[pyclass(name = "Match")]
#[derive(Clone, Debug)]
pub struct PyMatch {
    #[pyo3(get, set)]
    pub id: u32,

    #[pyo3(get, set)]
    pub home_team_id: u32,

    #[pyo3(get, set)]
    pub away_team_id: u32,

    #[pyo3(get, set)]
    pub week: u32,

    #[pyo3(get, set)]
    pub home_goals: Option<u32>,

    #[pyo3(get, set)]
    pub away_goals: Option<u32>,
}

#[pymethods]
impl PyMatch {
    #[new]
    #[pyo3(signature = (id, home_team_id, away_team_id, week, home_goals = None, away_goals = None))]
    pub fn new(
        id: u32,
        home_team_id: u32,
        away_team_id: u32,
        week: u32,
        home_goals: Option<u32>,
        away_goals: Option<u32>,
    ) -> Self {
        PyMatch {
            id,
            home_team_id,
            away_team_id,
            week,
            home_goals,
            away_goals,
        }
    }

    #[getter]
    fn played(&self) -> bool {
        self.home_goals.is_some() && self.away_goals.is_some()
    }

    fn __repr__(&self) -> String {
        format!(
            "Match({}, {} v {}, week {}, {:?}-{:?})",
            self.id, self.home_team_id, self.away_team_id, self.week, self.home_goals, self.away_goals
        )
    }
}

impl TryFrom<PyMatch> for Match {
    type Error = PyErr;

    fn try_from(m: PyMatch) -> PyResult<Match> {
        let mut fixture = Match::new(m.id, m.home_team_id, m.away_team_id, m.week);
        match (m.home_goals, m.away_goals) {
            (Some(home), Some(away)) => fixture.record(home, away),
            (None, None) => {}
            _ => {
                return Err(PyValueError::new_err(format!(
                    "match {} must set both goal counts or neither",
                    m.id
                )))
            }
        }
        Ok(fixture)
    }
}

#[pyclass(name = "Standing", get_all)]
#[derive(Clone, Debug)]
pub struct PyStanding {
    pub team_id: u32,
    pub team_name: String,
    pub points: u32,
    pub goals_for: u32,
    pub goals_against: u32,
    pub goal_difference: i64,
    pub matches_played: u32,
    pub wins: u32,
    pub draws: u32,
    pub losses: u32,
}

#[pymethods]
impl PyStanding {
    fn __repr__(&self) -> String {
        format!(
            "Standing({:?}, {} pts, {:+} gd, {}-{}-{})",
            self.team_name, self.points, self.goal_difference, self.wins, self.draws, self.losses
        )
    }
}

impl From<Standing> for PyStanding {
    fn from(s: Standing) -> Self {
        PyStanding {
            team_id: s.entry.team_id,
            team_name: s.entry.team_name,
            points: s.entry.points,
            goals_for: s.entry.goals_for,
            goals_against: s.entry.goals_against,
            goal_difference: s.entry.goal_difference,
            matches_played: s.entry.matches_played,
            wins: s.record.wins,
            draws: s.record.draws,
            losses: s.record.losses,
        }
    }
}

fn to_league(teams: Vec<PyTeam>, matches: Vec<PyMatch>) -> PyResult<League> {
    let teams = teams.into_iter().map(Team::from).collect();
    let matches = matches
        .into_iter()
        .map(Match::try_from)
        .collect::<PyResult<Vec<_>>>()?;
    Ok(League::new(teams, matches))
}

/// Simulate one match, returning (home_goals, away_goals).
#[pyfunction]
#[pyo3(signature = (home_strength, away_strength, seed = None))]
fn simulate_one(home_strength: u32, away_strength: u32, seed: Option<u64>) -> PyResult<(u32, u32)> {
    let mut rng = match seed {
        Some(s) => ChaCha8Rng::seed_from_u64(s),
        None => ChaCha8Rng::from_entropy(),
    };
    let score = simulate_match(home_strength, away_strength, &mut rng)?;
    Ok((score.home, score.away))
}

/// Sorted league table with win/draw/loss records.
#[pyfunction]
#[pyo3(name = "compute_table")]
fn py_compute_table(teams: Vec<PyTeam>, matches: Vec<PyMatch>) -> PyResult<Vec<PyStanding>> {
    let league = to_league(teams, matches)?;
    let table = compute_table(&league.teams, &league.matches)?;
    Ok(compute_standings_with_record(&table, &league.matches)
        .into_iter()
        .map(PyStanding::from)
        .collect())
}

/// Championship percentage per team name.
#[pyfunction]
#[pyo3(name = "estimate_champions")]
#[pyo3(signature = (teams, matches, trials = 1000, cutoff_week = 4, seed = None))]
fn py_estimate_champions(
    py: Python<'_>,
    teams: Vec<PyTeam>,
    matches: Vec<PyMatch>,
    trials: usize,
    cutoff_week: u32,
    seed: Option<u64>,
) -> PyResult<HashMap<String, f64>> {
    let league = to_league(teams, matches)?;
    let config = ProjectionConfig {
        trials,
        cutoff_week,
        seed,
    };
    let result = py.allow_threads(|| crate::projection::estimate_champions(&league, &config))?;
    Ok(result)
}

/// Python module definition
#[pymodule]
fn league_core(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_class::<PyTeam>()?;
    m.add_class::<PyMatch>()?;
    m.add_class::<PyStanding>()?;

    m.add_function(wrap_pyfunction!(simulate_one, m)?)?;
    m.add_function(wrap_pyfunction!(py_compute_table, m)?)?;
    m.add_function(wrap_pyfunction!(py_estimate_champions, m)?)?;

    m.add("CUTOFF_WEEK", crate::constants::CUTOFF_WEEK)?;
    m.add("DEFAULT_TRIALS", crate::constants::DEFAULT_TRIALS)?;

    Ok(())
}
