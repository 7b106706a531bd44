//! Builds a `Network` from flat edge-list inputs: a work edge list, an
//! optional play edge list, optional play-pool sizes, and optional planar
//! positions. Loads are a one-time synchronous pass; the resulting tables
//! are pre-allocated at caller-supplied maximum capacities and shrunk once
//! to their true extents at the end.

use log::{debug, info};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use crate::WardId;
use crate::error::MetapopError;
use crate::links::{LinkTable, PlayLinkTable};
use crate::network::Network;
use crate::nodes::NodeTable;

const DEFAULT_MAX_NODES: usize = 10_050;
const DEFAULT_MAX_LINKS: usize = 2_414_000;

/// A handful of implicit insertions papers over harmless gaps in the ward id
/// space; reaching this many in one build means the input is broken.
const MAX_GAP_FILL: usize = 20;

/// Builder for a ward-movement network.
///
/// ```no_run
/// # use metapop_core::build::NetworkBuilder;
/// let network = NetworkBuilder::new("work.dat")
///     .play("play.dat")
///     .play_sizes("play_size.dat")
///     .positions("position.dat")
///     .build()?;
/// # Ok::<(), metapop_core::MetapopError>(())
/// ```
pub struct NetworkBuilder {
    work: PathBuf,
    play: Option<PathBuf>,
    play_sizes: Option<PathBuf>,
    positions: Option<PathBuf>,
    max_nodes: usize,
    max_links: usize,
}

impl NetworkBuilder {
    pub fn new(work: impl Into<PathBuf>) -> Self {
        NetworkBuilder {
            work: work.into(),
            play: None,
            play_sizes: None,
            positions: None,
            max_nodes: DEFAULT_MAX_NODES,
            max_links: DEFAULT_MAX_LINKS,
        }
    }

    pub fn play(mut self, path: impl Into<PathBuf>) -> Self {
        self.play = Some(path.into());
        self
    }

    pub fn play_sizes(mut self, path: impl Into<PathBuf>) -> Self {
        self.play_sizes = Some(path.into());
        self
    }

    pub fn positions(mut self, path: impl Into<PathBuf>) -> Self {
        self.positions = Some(path.into());
        self
    }

    pub fn max_nodes(mut self, max_nodes: usize) -> Self {
        self.max_nodes = max_nodes;
        self
    }

    pub fn max_links(mut self, max_links: usize) -> Self {
        self.max_links = max_links;
        self
    }

    /// Runs the whole build: work load, gap-fill, play load (with its own
    /// gap-fill), pool-size overwrite, endpoint verification, distances,
    /// shrink-to-fit.
    pub fn build(&self) -> Result<Network, MetapopError> {
        let mut nodes = NodeTable::with_capacity(self.max_nodes + 1);
        let mut links = LinkTable::with_capacity(self.max_links + 1);

        let (nnodes, nlinks) = self.load_work_links(&mut nodes, &mut links)?;
        info!("number of wards equals {nnodes}");
        info!("number of work links equals {nlinks}");

        let mut network = Network {
            nodes,
            links,
            play: PlayLinkTable::with_capacity(1),
            nnodes,
            nlinks,
            plinks: 0,
        };

        fill_in_gaps(&mut network)?;
        debug!("number of wards after filling equals {}", network.nnodes);

        if let Some(play_path) = &self.play {
            self.build_play_matrix(&mut network, play_path)?;
            debug!("number of wards after play build equals {}", network.nnodes);
        }

        if let Some(sizes_path) = &self.play_sizes {
            load_play_sizes(&mut network, sizes_path)?;
        }

        let max_ward = verify_endpoints(&network)?;

        if let Some(positions_path) = &self.positions {
            load_positions(&mut network, positions_path)?;
            compute_distances(&mut network);
        }

        // One shrink-to-fit. Ward labels are normally dense, making the node
        // capacity nnodes + 1; a sparse label space keeps its highest slot.
        let node_capacity = (network.nnodes + 1).max(max_ward + 1);
        network.nodes.resize(node_capacity, node_capacity - 1)?;
        network.links.resize(network.nlinks + 1, network.nlinks)?;
        network.play.resize(network.plinks + 1, network.plinks)?;

        Ok(network)
    }

    fn load_work_links(
        &self,
        nodes: &mut NodeTable,
        links: &mut LinkTable,
    ) -> Result<(usize, usize), MetapopError> {
        let path = &self.work;
        let mut nnodes = 0;
        let mut nlinks = 0;

        for line in open_lines(path)? {
            let line = line.map_err(|source| io_error(path, source))?;
            let (from, to, weight) = parse_link_record(path, &line)?;

            if from == 0 || to == 0 {
                return Err(MetapopError::ZeroId {
                    path: path.clone(),
                    from,
                    to,
                });
            }
            check_ward_capacity(path, from, nodes.capacity())?;
            check_ward_capacity(path, to, nodes.capacity())?;
            check_link_capacity(path, nlinks + 1, links.capacity())?;

            nlinks += 1;

            if !nodes.is_occupied(WardId(from)) {
                nodes.occupy(WardId(from));
                nodes.begin_to[from] = nlinks;
                nodes.end_to[from] = nlinks;
                nnodes += 1;
            }
            if from == to {
                nodes.self_w[from] = nlinks;
            }
            nodes.end_to[from] += 1;

            // Work weights are whole counts of commuters; the truncation is
            // deliberate, do not "fix" it.
            let weight = weight.trunc();
            links.ifrom[nlinks] = from;
            links.ito[nlinks] = to;
            links.weight[nlinks] = weight;
            links.suscept[nlinks] = weight;

            nodes.denominator_n[from] += weight;
            nodes.denominator_d[to] += weight;
        }

        Ok((nnodes, nlinks))
    }

    fn build_play_matrix(
        &self,
        network: &mut Network,
        play_path: &Path,
    ) -> Result<(), MetapopError> {
        let mut play = PlayLinkTable::with_capacity(self.max_links + 1);
        let mut plinks = 0;

        // The label array doubles as a progress flag for this pass; wards
        // occupied by the work pass are restored once the load is done, so a
        // play file covering only a subset of wards stays valid.
        let work_occupancy = network.nodes.label.clone();
        network.nodes.clear_labels();
        let nodes = &mut network.nodes;

        for line in open_lines(play_path)? {
            let line = line.map_err(|source| io_error(play_path, source))?;
            let (from, to, weight) = parse_link_record(play_path, &line)?;

            if from == 0 || to == 0 {
                return Err(MetapopError::ZeroId {
                    path: play_path.to_path_buf(),
                    from,
                    to,
                });
            }
            check_ward_capacity(play_path, from, nodes.capacity())?;
            check_ward_capacity(play_path, to, nodes.capacity())?;
            check_link_capacity(play_path, plinks + 1, play.capacity())?;

            plinks += 1;

            if !nodes.is_occupied(WardId(from)) {
                nodes.occupy(WardId(from));
                nodes.begin_p[from] = plinks;
                nodes.end_p[from] = plinks;
            }
            if from == to {
                nodes.self_p[from] = plinks;
            }
            nodes.end_p[from] += 1;

            play.ifrom[plinks] = from;
            play.ito[plinks] = to;
            play.weight[plinks] = weight;

            nodes.denominator_p[from] += weight;
            nodes.play_suscept[from] += weight;
        }

        // When play and work come from the same file, the play weights are
        // renormalized per origin ward into row-stochastic form.
        let renormalise = *play_path == self.work;
        for j in 1..=plinks {
            if renormalise {
                play.weight[j] /= nodes.denominator_p[play.ifrom[j]];
            }
            play.suscept[j] = play.weight[j];
        }

        info!("number of play links equals {plinks}");
        network.play = play;
        network.plinks = plinks;

        // Merge the work-pass occupancy back in before gap-filling so the
        // gap accounting only counts genuinely new wards.
        for (ward, &label) in work_occupancy.iter().enumerate() {
            if label == ward as i64 {
                network.nodes.occupy(WardId(ward));
            }
        }

        fill_in_gaps(network)
    }
}

/// Marks any ward referenced by a work link but not yet occupied. Bounded:
/// a build needing `MAX_GAP_FILL` insertions is structurally broken input.
fn fill_in_gaps(network: &mut Network) -> Result<(), MetapopError> {
    let mut added = 0;

    for i in 1..=network.nlinks {
        let ito = network.links.ito[i];
        if !network.nodes.is_occupied(WardId(ito)) {
            debug!("adding ward {ito} referenced by link {i}");
            network.nodes.occupy(WardId(ito));
            network.nnodes += 1;

            added += 1;
            if added >= MAX_GAP_FILL {
                return Err(MetapopError::TooManyGapFills { added });
            }
        }
    }

    Ok(())
}

/// The play-size file is authoritative where present: sizes overwrite the
/// accumulated pools absolutely, they do not add to them.
fn load_play_sizes(network: &mut Network, path: &Path) -> Result<(), MetapopError> {
    for line in open_lines(path)? {
        let line = line.map_err(|source| io_error(path, source))?;
        let fields = split_fields(path, &line, 2)?;
        let ward: usize = parse_field(path, &line, fields[0])?;
        let size: f64 = parse_field(path, &line, fields[1])?;

        if ward == 0 {
            return Err(MetapopError::ZeroWard { path: path.to_path_buf() });
        }
        check_ward_capacity(path, ward, network.nodes.capacity())?;

        network.nodes.play_suscept[ward] = size;
        network.nodes.denominator_p[ward] = size;
        network.nodes.save_play_suscept[ward] = size;
    }

    Ok(())
}

fn load_positions(network: &mut Network, path: &Path) -> Result<(), MetapopError> {
    for line in open_lines(path)? {
        let line = line.map_err(|source| io_error(path, source))?;
        let fields = split_fields(path, &line, 3)?;
        let ward: usize = parse_field(path, &line, fields[0])?;
        let x: f64 = parse_field(path, &line, fields[1])?;
        let y: f64 = parse_field(path, &line, fields[2])?;

        if ward == 0 {
            return Err(MetapopError::ZeroWard { path: path.to_path_buf() });
        }
        check_ward_capacity(path, ward, network.nodes.capacity())?;

        network.nodes.x[ward] = x;
        network.nodes.y[ward] = y;
    }

    Ok(())
}

/// Euclidean distance for every work link. Play links never carry distance.
/// The total is a strictly sequential reduction.
fn compute_distances(network: &mut Network) {
    let nodes = &network.nodes;
    let links = &mut network.links;

    let mut total = 0.0;
    for i in 1..=network.nlinks {
        let dx = nodes.x[links.ifrom[i]] - nodes.x[links.ito[i]];
        let dy = nodes.y[links.ifrom[i]] - nodes.y[links.ito[i]];
        let distance = (dx * dx + dy * dy).sqrt();

        links.distance[i] = distance;
        total += distance;
    }

    info!("total distance equals {total}");
}

/// Post-gap-fill consistency check: every endpoint of every link must be an
/// occupied ward. Returns the highest ward index seen.
fn verify_endpoints(network: &Network) -> Result<usize, MetapopError> {
    let mut max_ward = 0;

    for i in 1..=network.nlinks {
        for ward in [network.links.ifrom[i], network.links.ito[i]] {
            if !network.nodes.is_occupied(WardId(ward)) {
                return Err(MetapopError::DanglingLink { link: i, ward });
            }
            max_ward = max_ward.max(ward);
        }
    }
    for i in 1..=network.plinks {
        for ward in [network.play.ifrom[i], network.play.ito[i]] {
            if !network.nodes.is_occupied(WardId(ward)) {
                return Err(MetapopError::DanglingLink { link: i, ward });
            }
            max_ward = max_ward.max(ward);
        }
    }

    Ok(max_ward)
}

fn open_lines(
    path: &Path,
) -> Result<impl Iterator<Item = std::io::Result<String>>, MetapopError> {
    let file = File::open(path).map_err(|source| io_error(path, source))?;
    Ok(BufReader::new(file).lines())
}

fn io_error(path: &Path, source: std::io::Error) -> MetapopError {
    MetapopError::Io {
        path: path.to_path_buf(),
        source,
    }
}

fn split_fields<'a>(
    path: &Path,
    line: &'a str,
    expected: usize,
) -> Result<Vec<&'a str>, MetapopError> {
    let fields: Vec<&str> = line.split_whitespace().collect();
    if fields.len() != expected {
        return Err(MetapopError::Parse {
            path: path.to_path_buf(),
            context: line.to_string(),
        });
    }
    Ok(fields)
}

fn parse_field<T: std::str::FromStr>(
    path: &Path,
    line: &str,
    field: &str,
) -> Result<T, MetapopError> {
    field.parse().map_err(|_| MetapopError::Parse {
        path: path.to_path_buf(),
        context: line.to_string(),
    })
}

fn parse_link_record(path: &Path, line: &str) -> Result<(usize, usize, f64), MetapopError> {
    let fields = split_fields(path, line, 3)?;
    Ok((
        parse_field(path, line, fields[0])?,
        parse_field(path, line, fields[1])?,
        parse_field(path, line, fields[2])?,
    ))
}

fn check_ward_capacity(path: &Path, id: usize, capacity: usize) -> Result<(), MetapopError> {
    if id >= capacity {
        return Err(MetapopError::CapacityExceeded {
            path: path.to_path_buf(),
            id,
            capacity,
        });
    }
    Ok(())
}

fn check_link_capacity(path: &Path, index: usize, capacity: usize) -> Result<(), MetapopError> {
    if index >= capacity {
        return Err(MetapopError::CapacityExceeded {
            path: path.to_path_buf(),
            id: index,
            capacity,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn write_file(dir: &TempDir, name: &str, contents: &str) -> PathBuf {
        let path = dir.path().join(name);
        fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn two_link_build_gap_fills_the_missing_ward() {
        let dir = tempfile::tempdir().unwrap();
        let work = write_file(&dir, "work.dat", "1 2 5.0\n2 3 3.0\n");

        let network = NetworkBuilder::new(&work)
            .max_nodes(10)
            .max_links(10)
            .build()
            .unwrap();

        assert_eq!(network.nnodes, 3);
        assert_eq!(network.nlinks, 2);
        for i in 1..=3 {
            assert_eq!(network.nodes.label[i], i as i64);
        }
        assert_eq!(network.nodes.denominator_n[1], 5.0);
        assert_eq!(network.nodes.denominator_d[2], 5.0);
        assert_eq!(network.nodes.denominator_n[2], 3.0);
        assert_eq!(network.nodes.denominator_d[3], 3.0);
    }

    #[test]
    fn work_weights_are_truncated_to_whole_counts() {
        let dir = tempfile::tempdir().unwrap();
        let work = write_file(&dir, "work.dat", "1 2 5.9\n2 1 0.4\n");

        let network = NetworkBuilder::new(&work)
            .max_nodes(5)
            .max_links(5)
            .build()
            .unwrap();

        assert_eq!(network.links.weight[1], 5.0);
        assert_eq!(network.links.suscept[1], 5.0);
        assert_eq!(network.links.weight[2], 0.0);
        assert_eq!(network.nodes.denominator_n[1], 5.0);
        assert_eq!(network.nodes.denominator_d[1], 0.0);
    }

    #[test]
    fn zero_id_fails_the_whole_build() {
        let dir = tempfile::tempdir().unwrap();
        let work = write_file(&dir, "work.dat", "1 2 5.0\n0 1 1.0\n");

        let err = NetworkBuilder::new(&work)
            .max_nodes(5)
            .max_links(5)
            .build()
            .unwrap_err();
        assert!(matches!(err, MetapopError::ZeroId { from: 0, to: 1, .. }));
    }

    #[test]
    fn malformed_line_names_the_file_and_content() {
        let dir = tempfile::tempdir().unwrap();
        let work = write_file(&dir, "work.dat", "1 2 5.0\n1 2\n");

        let err = NetworkBuilder::new(&work)
            .max_nodes(5)
            .max_links(5)
            .build()
            .unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("work.dat"));
        assert!(msg.contains("1 2"));
    }

    #[test]
    fn non_numeric_weight_is_a_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let work = write_file(&dir, "work.dat", "1 2 lots\n");

        let err = NetworkBuilder::new(&work)
            .max_nodes(5)
            .max_links(5)
            .build()
            .unwrap_err();
        assert!(matches!(err, MetapopError::Parse { .. }));
    }

    #[test]
    fn work_ranges_follow_file_order() {
        let dir = tempfile::tempdir().unwrap();
        let work = write_file(&dir, "work.dat", "1 2 1.0\n1 3 1.0\n1 1 1.0\n2 1 1.0\n");

        let network = NetworkBuilder::new(&work)
            .max_nodes(5)
            .max_links(10)
            .build()
            .unwrap();

        assert_eq!(network.nodes.work_range(WardId(1)), 1..4);
        assert_eq!(network.nodes.work_range(WardId(2)), 4..5);
        // The 1->1 self-loop is link 3.
        assert_eq!(network.nodes.self_w[1], 3);
        assert_eq!(network.nodes.self_w[2], 0);
    }

    #[test]
    fn too_many_gap_fills_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let mut contents = String::new();
        for to in 2..=21 {
            contents.push_str(&format!("1 {to} 1.0\n"));
        }
        let work = write_file(&dir, "work.dat", &contents);

        let err = NetworkBuilder::new(&work)
            .max_nodes(30)
            .max_links(30)
            .build()
            .unwrap_err();
        assert!(matches!(err, MetapopError::TooManyGapFills { added: 20 }));
    }

    #[test]
    fn ward_id_beyond_capacity_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let work = write_file(&dir, "work.dat", "1 200 1.0\n");

        let err = NetworkBuilder::new(&work)
            .max_nodes(5)
            .max_links(5)
            .build()
            .unwrap_err();
        assert!(matches!(err, MetapopError::CapacityExceeded { id: 200, .. }));
    }

    #[test]
    fn tables_shrink_to_true_extents() {
        let dir = tempfile::tempdir().unwrap();
        let work = write_file(&dir, "work.dat", "1 2 5.0\n2 3 3.0\n");
        let play = write_file(&dir, "play.dat", "1 2 0.5\n2 3 0.5\n3 3 1.0\n");

        let network = NetworkBuilder::new(&work)
            .play(&play)
            .max_nodes(100)
            .max_links(100)
            .build()
            .unwrap();

        assert_eq!(network.nodes.capacity(), network.nnodes + 1);
        assert_eq!(network.links.capacity(), network.nlinks + 1);
        assert_eq!(network.play.capacity(), network.plinks + 1);
        // Entries survive the shrink at their original index.
        assert_eq!(network.links.weight[1], 5.0);
        assert_eq!(network.play.weight[3], 1.0);
    }

    #[test]
    fn play_load_accumulates_pools_without_truncation() {
        let dir = tempfile::tempdir().unwrap();
        let work = write_file(&dir, "work.dat", "1 2 5.0\n2 3 3.0\n");
        let play = write_file(&dir, "play.dat", "1 2 0.5\n1 3 0.25\n2 2 1.5\n3 3 1.0\n");

        let network = NetworkBuilder::new(&work)
            .play(&play)
            .max_nodes(10)
            .max_links(10)
            .build()
            .unwrap();

        assert_eq!(network.plinks, 4);
        assert_eq!(network.play.weight[2], 0.25);
        assert_eq!(network.play.suscept[2], 0.25);
        assert_eq!(network.nodes.play_suscept[1], 0.75);
        assert_eq!(network.nodes.denominator_p[1], 0.75);
        assert_eq!(network.nodes.play_range(WardId(1)), 1..3);
        assert_eq!(network.nodes.self_p[2], 3);
    }

    #[test]
    fn same_source_play_weights_are_renormalized() {
        let dir = tempfile::tempdir().unwrap();
        let work = write_file(&dir, "work.dat", "1 2 6.0\n1 3 2.0\n2 2 4.0\n3 3 1.0\n");

        let network = NetworkBuilder::new(&work)
            .play(&work)
            .max_nodes(10)
            .max_links(10)
            .build()
            .unwrap();

        // Row-stochastic per origin ward in the self-source case.
        assert_eq!(network.play.weight[1], 0.75);
        assert_eq!(network.play.weight[2], 0.25);
        assert_eq!(network.play.weight[3], 1.0);
        assert_eq!(network.play.weight[4], 1.0);
        assert_eq!(network.play.suscept[1], 0.75);
    }

    #[test]
    fn play_sizes_overwrite_absolutely() {
        let dir = tempfile::tempdir().unwrap();
        let work = write_file(&dir, "work.dat", "1 2 5.0\n2 1 3.0\n");
        let play = write_file(&dir, "play.dat", "1 2 0.5\n2 1 0.5\n");
        let sizes = write_file(&dir, "sizes.dat", "1 120\n");

        let network = NetworkBuilder::new(&work)
            .play(&play)
            .play_sizes(&sizes)
            .max_nodes(10)
            .max_links(10)
            .build()
            .unwrap();

        assert_eq!(network.nodes.play_suscept[1], 120.0);
        assert_eq!(network.nodes.denominator_p[1], 120.0);
        assert_eq!(network.nodes.save_play_suscept[1], 120.0);
        // Ward 2 keeps its accumulated pool.
        assert_eq!(network.nodes.play_suscept[2], 0.5);
        assert_eq!(network.nodes.save_play_suscept[2], 0.0);
    }

    #[test]
    fn positions_give_work_links_euclidean_distances() {
        let dir = tempfile::tempdir().unwrap();
        let work = write_file(&dir, "work.dat", "1 2 5.0\n2 1 3.0\n");
        let positions = write_file(&dir, "pos.dat", "1 0.0 0.0\n2 3.0 4.0\n");

        let network = NetworkBuilder::new(&work)
            .positions(&positions)
            .max_nodes(10)
            .max_links(10)
            .build()
            .unwrap();

        assert_eq!(network.links.distance[1], 5.0);
        assert_eq!(network.links.distance[2], 5.0);
        assert_eq!(network.min_max_distance(), (0.0, 5.0));
    }
}
