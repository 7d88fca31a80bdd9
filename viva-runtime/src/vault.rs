use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use serde::{Deserialize, Serialize};

use viva_core::types::{MediaBlob, SessionId, SubmissionStatus};
use viva_engine::traits::{AnswerVault, VaultError};

/// On-disk answer vault: one directory per session holding each recorded
/// blob and a manifest with per-answer state plus the question log.
///
/// Layout:
///
/// ```text
/// <root>/<session>/session.json
/// <root>/<session>/answer-000.bin
/// <root>/<session>/answer-001.bin
/// ```
#[derive(Debug)]
pub struct FsAnswerVault {
    dir: PathBuf,
    // Manifest updates are read-modify-write; serialize them.
    manifest_lock: Mutex<()>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct Manifest {
    #[serde(default)]
    answers: Vec<AnswerEntry>,
    #[serde(default)]
    questions: Vec<QuestionEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct AnswerEntry {
    index: usize,
    mime: String,
    file: String,
    status: SubmissionStatus,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct QuestionEntry {
    index: usize,
    text: String,
}

impl FsAnswerVault {
    pub fn at_root(root: impl Into<PathBuf>, session: &SessionId) -> Self {
        Self {
            dir: root.into().join(session.as_str()),
            manifest_lock: Mutex::new(()),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Recorded submission state of the answer at `index`, if any.
    pub fn status(&self, index: usize) -> Result<Option<SubmissionStatus>, VaultError> {
        let manifest = self.load_manifest()?;
        Ok(manifest
            .answers
            .iter()
            .find(|a| a.index == index)
            .map(|a| a.status))
    }

    fn manifest_path(&self) -> PathBuf {
        self.dir.join("session.json")
    }

    fn answer_filename(index: usize) -> String {
        format!("answer-{index:03}.bin")
    }

    fn load_manifest(&self) -> Result<Manifest, VaultError> {
        let path = self.manifest_path();
        if !path.exists() {
            return Ok(Manifest::default());
        }
        let raw = fs::read(&path)?;
        serde_json::from_slice(&raw).map_err(|e| VaultError::Encode(e.to_string()))
    }

    fn save_manifest(&self, manifest: &Manifest) -> Result<(), VaultError> {
        let json =
            serde_json::to_vec_pretty(manifest).map_err(|e| VaultError::Encode(e.to_string()))?;
        fs::create_dir_all(&self.dir)?;
        let path = self.manifest_path();
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, json)?;
        replace_file(&tmp, &path)?;
        Ok(())
    }

    fn update_manifest(
        &self,
        apply: impl FnOnce(&mut Manifest) -> Result<(), VaultError>,
    ) -> Result<(), VaultError> {
        let _guard = self.manifest_lock.lock().unwrap_or_else(|e| e.into_inner());
        let mut manifest = self.load_manifest()?;
        apply(&mut manifest)?;
        self.save_manifest(&manifest)
    }
}

impl AnswerVault for FsAnswerVault {
    fn store(&self, index: usize, blob: &MediaBlob) -> Result<(), VaultError> {
        fs::create_dir_all(&self.dir)?;
        let file = Self::answer_filename(index);
        let path = self.dir.join(&file);
        let tmp = path.with_extension("bin.tmp");
        fs::write(&tmp, &blob.bytes)?;
        replace_file(&tmp, &path)?;

        self.update_manifest(|m| {
            m.answers.retain(|a| a.index != index);
            m.answers.push(AnswerEntry {
                index,
                mime: blob.mime.clone(),
                file,
                status: SubmissionStatus::Pending,
            });
            m.answers.sort_by_key(|a| a.index);
            Ok(())
        })
    }

    fn get(&self, index: usize) -> Result<Option<MediaBlob>, VaultError> {
        let manifest = self.load_manifest()?;
        let Some(entry) = manifest.answers.iter().find(|a| a.index == index) else {
            return Ok(None);
        };
        let bytes = fs::read(self.dir.join(&entry.file))?;
        Ok(Some(MediaBlob::new(entry.mime.clone(), bytes)))
    }

    fn indices(&self) -> Result<Vec<usize>, VaultError> {
        let manifest = self.load_manifest()?;
        Ok(manifest.answers.iter().map(|a| a.index).collect())
    }

    fn set_status(&self, index: usize, status: SubmissionStatus) -> Result<(), VaultError> {
        self.update_manifest(|m| {
            let entry = m
                .answers
                .iter_mut()
                .find(|a| a.index == index)
                .ok_or(VaultError::Missing(index))?;
            entry.status = status;
            Ok(())
        })
    }

    fn record_question(&self, index: usize, text: &str) -> Result<(), VaultError> {
        self.update_manifest(|m| {
            m.questions.retain(|q| q.index != index);
            m.questions.push(QuestionEntry {
                index,
                text: text.to_string(),
            });
            m.questions.sort_by_key(|q| q.index);
            Ok(())
        })
    }

    fn questions(&self) -> Result<Vec<(usize, String)>, VaultError> {
        let manifest = self.load_manifest()?;
        Ok(manifest
            .questions
            .into_iter()
            .map(|q| (q.index, q.text))
            .collect())
    }
}

/// Replace `dst` with `tmp`, keeping a backup until the rename lands.
/// Handles Windows, where a plain rename fails if the destination exists.
pub fn replace_file(tmp: &Path, dst: &Path) -> std::io::Result<()> {
    let backup = dst.with_extension("bak");

    if dst.exists() {
        let _ = fs::remove_file(&backup);
        fs::rename(dst, &backup)?;
    }

    if let Err(e) = fs::rename(tmp, dst) {
        // Try to restore the previous file if we had one.
        if backup.exists() {
            let _ = fs::rename(&backup, dst);
        }
        let _ = fs::remove_file(tmp);
        return Err(e);
    }

    let _ = fs::remove_file(&backup);
    Ok(())
}
